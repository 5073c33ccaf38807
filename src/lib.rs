pub mod answer;
pub mod config;
pub mod draft;
pub mod exchange;
pub mod logging;
pub mod state;

// Re-export main types for convenience
pub use answer::{AnswerClient, AnswerError, AnswerService};
pub use config::Config;
pub use draft::DraftInput;
pub use exchange::{ExchangeController, ExchangePhase, Submission, FAILURE_REPLY};
pub use state::{Message, Origin, Transcript};
