use crate::types::{Field, Group, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("{stage}: invalid configuration: {reason}")]
    InvalidConfiguration { stage: &'static str, reason: String },

    #[error("scorer: user {user_id} has {field} = {value}, outside [{min}, {max}]")]
    InvalidInput {
        user_id: UserId,
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("reporter: group {group} has no records, aggregate undefined")]
    EmptyDataset { group: Group },

    #[error("reporter: {metric} baseline for group A is zero, relative change undefined")]
    UndefinedBaseline { metric: &'static str },

    #[error("reporter: user {user_id} has not been scored")]
    Unscored { user_id: UserId },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("chart: {0}")]
    Chart(String),
}

impl AuditError {
    pub fn invalid_config(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            stage,
            reason: reason.into(),
        }
    }

    /// Process exit code for this failure. 0 is reserved for success.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfiguration { .. } => 2,
            Self::InvalidInput { .. } | Self::Unscored { .. } => 3,
            Self::EmptyDataset { .. } => 4,
            Self::UndefinedBaseline { .. } => 5,
            _ => 1,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;
