use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size of the retention window: only this many of the most recently
/// submitted questions are kept.
pub const MAX_RECENT: usize = 10;

/// A single submitted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, assigned as the number of stored questions plus one.
    /// Once the retention window fills up and old entries get dropped,
    /// later questions can reuse the same value.
    pub id: u32,
    /// The submitted text.
    pub question: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Create a question submitted now.
    pub fn new(id: u32, question: String) -> Self {
        Self {
            id,
            question,
            created_at: Utc::now(),
        }
    }
}
