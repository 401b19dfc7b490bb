use serde::{Deserialize, Serialize};

/// A reviewer's verdict for one occurrence group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decision {
    #[default]
    Pending,
    /// Substitute the canonical entity's alias.
    Confirmed,
    /// Leave every member occurrence as written.
    Rejected,
    /// Substitute this text instead of a derived alias.
    Edited(String),
}

impl Decision {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}
