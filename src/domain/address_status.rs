use crate::domain::LocationError;
use chrono::{DateTime, Utc};

/// Lets observers tell "still waiting" apart from "gave up".
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AddressStatus {
    #[default]
    Pending,
    Resolving {
        sequence: u64,
    },
    Resolved {
        resolved_at: DateTime<Utc>,
    },
    Failed(LocationError),
}
