use std::fmt;

/// Errors raised inside the DRL planner. They are handled internally by
/// falling back to A* and never cross the planner boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DrlError {
    /// The configuration cannot produce a working model.
    InvalidConfig(String),
    /// A prediction or update produced a non-finite value.
    NumericFailure { stage: &'static str, value: f32 },
    /// Training was requested on an empty batch.
    EmptyBatch,
}

impl fmt::Display for DrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "drl: invalid configuration: {msg}"),
            Self::NumericFailure { stage, value } => {
                write!(f, "drl: non-finite value {value} during {stage}")
            }
            Self::EmptyBatch => write!(f, "drl: cannot train on an empty batch"),
        }
    }
}

impl std::error::Error for DrlError {}
