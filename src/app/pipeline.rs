//! Per-message command pipeline.
//!
//! ```text
//! sender, text ──▶ authorise ──▶ number length ──▶ body length
//!                      │               │                │
//!                 broadcast        broadcast      private reply
//!                      ▼
//!             dispatch table ──▶ executor ──▶ private reply
//! ```
//!
//! The reply is sent after execution, and is attempted even when
//! execution failed.

use std::sync::Arc;

use log::{info, warn};

use super::auth::{MIN_PHONE_DIGITS, PhoneAuthorizer, clean_phone_number};
use super::commands::CommandResponse;
use super::dispatch::CommandDispatchTable;
use super::executor::CommandExecutor;
use super::ports::BroadcastSink;

/// Longest message body (characters) the pipeline will act on.
pub const MAX_MESSAGE_CHARS: usize = 32;

/// What the pipeline did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Sender not on the whitelist.
    Unauthorized,
    /// Sender number too short after cleaning.
    InvalidNumber,
    /// Body empty or longer than [`MAX_MESSAGE_CHARS`].
    InvalidLength,
    /// A command was formed and executed.
    Executed {
        response: CommandResponse,
        state_changed: bool,
    },
}

impl PipelineOutcome {
    pub fn state_changed(&self) -> bool {
        matches!(
            self,
            Self::Executed {
                state_changed: true,
                ..
            }
        )
    }
}

pub struct CommandPipeline {
    authorizer: PhoneAuthorizer,
    dispatch: CommandDispatchTable,
    executor: CommandExecutor,
    sink: Arc<dyn BroadcastSink>,
}

impl CommandPipeline {
    pub fn new(
        authorizer: PhoneAuthorizer,
        dispatch: CommandDispatchTable,
        executor: CommandExecutor,
        sink: Arc<dyn BroadcastSink>,
    ) -> Self {
        Self {
            authorizer,
            dispatch,
            executor,
            sink,
        }
    }

    pub fn process(&self, sender: &str, text: &str) -> PipelineOutcome {
        let text = text.to_lowercase();
        info!("Processing message: {}", text);

        let phone_number = clean_phone_number(sender);

        if !self.authorizer.is_allowed(&phone_number) {
            self.sink
                .broadcast(&format!("Received unauthorized SMS from {}", phone_number));
            return PipelineOutcome::Unauthorized;
        }

        if phone_number.len() < MIN_PHONE_DIGITS {
            self.sink.broadcast(&format!(
                "Attempt from invalid phone number {} received.",
                phone_number
            ));
            return PipelineOutcome::InvalidNumber;
        }

        let length = text.chars().count();
        if length == 0 || length > MAX_MESSAGE_CHARS {
            let notice = "Message was invalid length.";
            self.sink.send(&phone_number, notice);
            warn!("{} ({} chars from {})", notice, length, phone_number);
            return PipelineOutcome::InvalidLength;
        }

        let response = self.dispatch.respond(&text, &phone_number);
        let state_changed = self.executor.execute(&response);
        info!("Executed {} (state changed: {})", response.command(), state_changed);

        if !response.message().is_empty() {
            self.sink.send(&phone_number, response.message());
        }

        PipelineOutcome::Executed {
            response,
            state_changed,
        }
    }

    /// Form and execute a command from a trusted local surface.  No
    /// sender checks, no length policy, no reply.
    pub fn process_local(&self, text: &str) -> CommandResponse {
        let response = self.dispatch.respond(&text.to_lowercase(), "local");
        self.executor.execute(&response);
        response
    }
}
