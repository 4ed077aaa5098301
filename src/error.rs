use crate::types::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid selection policy: {0}")]
    InvalidPolicy(String),
    #[error("session queue is exhausted")]
    ExhaustedQueue,
    #[error("feedback for record {0} which is not outstanding in this session")]
    UntrackedFeedback(RecordId),
    #[error("record {0} was removed from the pool during the session")]
    StaleRecord(RecordId),
    #[error("selection already performed; reset the session first")]
    SelectionAlreadyPerformed,
    #[error("selection has not been performed yet")]
    SelectionNotPerformed,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Policy(#[from] SchedulerError),
}
