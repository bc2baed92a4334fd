use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A caller broke an operation's precondition, e.g. pushed no node.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("operation code {0} is outside 1..=100")]
    InvalidOpCode(u8),

    #[error("invalid workload config: {0}")]
    InvalidConfig(String),

    /// A workload thread unwound instead of finishing its plan.
    #[error("worker thread {id} panicked")]
    WorkerPanicked { id: usize },
}
