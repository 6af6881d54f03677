use crate::transition::{Action, TargetKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("no {kind} with id {id}")]
    NotFound { kind: TargetKind, id: String },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: TargetKind, id: String },

    #[error("{kind} records do not support {action}")]
    ActionNotSupported { kind: TargetKind, action: Action },

    #[error("invalid transition: cannot {action} a {kind} that is {from}")]
    InvalidTransition {
        kind: TargetKind,
        action: Action,
        from: String,
    },

    #[error("{kind} {id} is at generation {actual}, expected {expected}")]
    StaleGeneration {
        kind: TargetKind,
        id: String,
        expected: i64,
        actual: i64,
    },

    #[error("{kind} {id} was changed by another editor")]
    ConcurrentUpdate { kind: TargetKind, id: String },

    #[error("unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}
