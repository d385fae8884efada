//! Inbound message batch — one pass over everything stored on the SIM.
//!
//! Each message is deleted from the SIM *before* it is processed, so a
//! crash mid-command can lose a message but never replay it.  A message
//! whose deletion fails is left for the next cycle rather than processed.
//!
//! Processing stops after the first command that changes relay or host
//! state.  The rest of the batch stays on the SIM and is fetched again
//! next cycle, after the change has taken effect.

use std::sync::Arc;

use log::{info, warn};

use crate::error::ModemError;

use super::messages::{InboundMessage, sort_by_sent_time};
use super::pipeline::{CommandPipeline, PipelineOutcome};
use super::ports::{BroadcastSink, ClockPort, ModemPort};

/// Counts from one batch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Messages fetched from the modem.
    pub found: usize,
    /// Messages deleted and looked at (including too-old ones).
    pub processed: usize,
}

impl BatchReport {
    pub fn any_found(&self) -> bool {
        self.found > 0
    }
}

pub struct MessageBatchProcessor {
    modem: Arc<dyn ModemPort>,
    clock: Arc<dyn ClockPort>,
    sink: Arc<dyn BroadcastSink>,
    oldest_message_minutes: u64,
}

impl MessageBatchProcessor {
    pub fn new(
        modem: Arc<dyn ModemPort>,
        clock: Arc<dyn ClockPort>,
        sink: Arc<dyn BroadcastSink>,
        oldest_message_minutes: u32,
    ) -> Self {
        Self {
            modem,
            clock,
            sink,
            oldest_message_minutes: u64::from(oldest_message_minutes),
        }
    }

    pub fn run(&self, pipeline: &CommandPipeline) -> Result<BatchReport, ModemError> {
        if !self.modem.is_message_waiting() {
            return Ok(BatchReport::default());
        }

        let mut batch = self.modem.get_messages()?;
        sort_by_sent_time(&mut batch);

        let mut report = BatchReport {
            found: batch.len(),
            ..BatchReport::default()
        };

        for message in &batch {
            if let Err(e) = self.modem.delete_message(message) {
                warn!("Could not delete message in slot {}: {}", message.slot, e);
                continue;
            }
            report.processed += 1;

            if self.is_too_old(message) {
                continue;
            }

            let outcome = pipeline.process(&message.sender, &message.text);
            if let PipelineOutcome::Executed { response, .. } = &outcome {
                info!("Replied: {}", super::notify::escape(response.message()));
            }
            if outcome.state_changed() {
                break;
            }
        }

        if report.any_found() {
            info!(
                "Found {} messages, processed {}",
                report.found, report.processed
            );
        }
        Ok(report)
    }

    fn is_too_old(&self, message: &InboundMessage) -> bool {
        let minutes = message.minutes_waiting(self.clock.now_unix_secs());
        if minutes > self.oldest_message_minutes {
            self.sink
                .broadcast(&format!("MSG too old, {} minutes old.", minutes));
            return true;
        }
        false
    }
}
