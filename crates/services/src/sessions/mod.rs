mod store;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use store::SessionStore;
pub use view::{AnswerOutcome, CardView, TierProgress, WordHint, WordPrompt};
pub use workflow::SessionWorkflow;
