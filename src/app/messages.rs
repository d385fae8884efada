//! Inbound SMS as reported by the modem.

/// One stored SMS.  `sent_at` is the modem's timestamp for when the
/// sender's handset submitted it, which is not necessarily receipt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// SIM storage slot (used for deletion).
    pub slot: u32,
    pub sender: String,
    pub text: String,
    /// Unix seconds.
    pub sent_at: u64,
}

impl InboundMessage {
    pub fn new(slot: u32, sender: impl Into<String>, text: impl Into<String>, sent_at: u64) -> Self {
        Self {
            slot,
            sender: sender.into(),
            text: text.into(),
            sent_at,
        }
    }

    /// Whole minutes since the message was sent.  A timestamp in the
    /// future (clock skew) counts as zero.
    pub fn minutes_waiting(&self, now_unix_secs: u64) -> u64 {
        now_unix_secs.saturating_sub(self.sent_at) / 60
    }
}

/// Sort a fetched batch into send order.  Stable, so messages sharing a
/// timestamp keep their fetch order.
pub fn sort_by_sent_time(batch: &mut [InboundMessage]) {
    batch.sort_by_key(|m| m.sent_at);
}
