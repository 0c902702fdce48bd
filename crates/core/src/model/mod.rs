mod ids;
mod learner;
mod progress;
mod session;
mod stats;
mod tier;
mod word;

pub use ids::{LearnerId, ParseIdError, WordId};

pub use learner::{Learner, LearnerKey};
pub use progress::{MasteryLevel, ProgressRecord};
pub use session::SessionState;
pub use stats::TierStats;
pub use tier::{Tier, TierError};
pub use word::{NewWord, WordEnrichment, WordEntry, WordRole, local_audio_path};
