pub mod completion;
pub mod context;
pub mod error;
pub mod judge;
pub mod message;
pub mod record;
pub mod topic;

pub use completion::{ChatModel, CompletionError, CompletionRequest};
pub use context::{estimated_tokens, trim_to_budget, trim_with, CharRatio, TokenEstimator};
pub use error::{PrefError, PrefResult};
pub use judge::{parse_verdict, Verdict};
pub use message::{render_transcript, Message, Role};
pub use record::{ExperimentRecord, JudgeDecision, Outcome, WinRates, WinTally};
pub use topic::{ContentPreferences, Preferences, StylisticPreferences, Topic, TopicId};
