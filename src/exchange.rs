//! Request/response cycle for the chat transcript.
//!
//! One cycle is: append the user's line, ask the answer service, append the
//! agent's line (or a fixed apology on failure), then go idle again. Only one
//! cycle may be outstanding; submissions made meanwhile are dropped.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::answer::{AnswerError, AnswerService};
use crate::draft::DraftInput;
use crate::state::{Message, Transcript};

/// Shown in place of an answer whenever the answer service fails.
pub const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    AwaitingResponse,
}

/// What `submit` did with a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A cycle was started.
    Accepted,
    /// Draft was empty or whitespace; nothing happened.
    Empty,
    /// A cycle is already outstanding; the draft was dropped.
    Busy,
}

type PendingAnswer = JoinHandle<Result<String, AnswerError>>;

pub struct ExchangeController {
    transcript: Transcript,
    draft: DraftInput,
    busy: bool,
    service: Arc<dyn AnswerService>,
    pending: Option<PendingAnswer>,
}

impl ExchangeController {
    pub fn new(service: Arc<dyn AnswerService>) -> Self {
        Self {
            transcript: Transcript::new(),
            draft: DraftInput::new(),
            busy: false,
            service,
            pending: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &DraftInput {
        &self.draft
    }

    /// The draft is read-only while a cycle is outstanding.
    pub fn editable_draft(&mut self) -> Option<&mut DraftInput> {
        if self.busy {
            None
        } else {
            Some(&mut self.draft)
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn phase(&self) -> ExchangePhase {
        if self.busy {
            ExchangePhase::AwaitingResponse
        } else {
            ExchangePhase::Idle
        }
    }

    /// Start a cycle for `draft`.
    ///
    /// The user's line is appended and the draft cleared before the request is
    /// issued. The request itself runs on a spawned task; its outcome is
    /// applied by [`poll_response`](Self::poll_response) or
    /// [`settle`](Self::settle). Must be called from within a tokio runtime.
    pub fn submit(&mut self, draft: &str) -> Submission {
        let query = draft.trim();
        if query.is_empty() {
            debug!("ignoring empty submission");
            return Submission::Empty;
        }
        if self.busy {
            debug!("dropping submission while awaiting a response");
            return Submission::Busy;
        }

        self.transcript.append(Message::user(query));
        self.draft.clear();
        self.busy = true;

        let service = Arc::clone(&self.service);
        let query = query.to_string();
        debug!(query_chars = query.chars().count(), "submitting query");
        self.pending = Some(tokio::spawn(async move { service.answer(&query).await }));

        Submission::Accepted
    }

    /// Submit whatever is currently in the draft input.
    pub fn submit_draft(&mut self) -> Submission {
        let text = self.draft.text().to_string();
        self.submit(&text)
    }

    /// Apply the outstanding answer if it has arrived. Never blocks.
    ///
    /// Returns true when a cycle completed during this call.
    pub fn poll_response(&mut self) -> bool {
        let Some(handle) = self.pending.as_mut() else {
            return false;
        };
        if !handle.is_finished() {
            return false;
        }
        let Some(joined) = handle.now_or_never() else {
            return false;
        };
        self.pending = None;
        self.complete(flatten(joined));
        true
    }

    /// Wait for the outstanding cycle, if any, and apply its outcome.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending.as_mut() {
            let joined = handle.await;
            self.pending = None;
            self.complete(flatten(joined));
        }
    }

    /// Start a fresh session. Refused while a cycle is outstanding.
    pub fn reset(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.transcript.clear();
        self.draft.clear();
        info!("session reset");
        true
    }

    fn complete(&mut self, outcome: Result<String, AnswerError>) {
        let outcome = outcome.and_then(|text| {
            if text.trim().is_empty() {
                Err(AnswerError::EmptyResponse)
            } else {
                Ok(text)
            }
        });

        let reply = match outcome {
            Ok(text) => {
                info!(answer_chars = text.chars().count(), "answer received");
                Message::agent(text)
            }
            Err(err) => {
                error!(error = %err, "answer request failed");
                Message::agent(FAILURE_REPLY)
            }
        };

        self.transcript.append(reply);
        self.busy = false;
    }
}

fn flatten(joined: Result<Result<String, AnswerError>, JoinError>) -> Result<String, AnswerError> {
    joined.unwrap_or_else(|err| Err(AnswerError::TaskFailed(err.to_string())))
}
