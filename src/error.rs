use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    DatasetIo(String),
    #[error("{0}")]
    DatasetParse(String),
    #[error("dataset must contain at least one message")]
    EmptyDataset,
    #[error("duplicate message id '{0}'")]
    DuplicateMessageId(String),
    #[error("message '{0}' is malformed: {1}")]
    InvalidMessage(String, String),
    #[error("speed must be a positive finite number (got {0})")]
    InvalidSpeed(f64),
    #[error("frame interval must be > 0 (got {0}ms)")]
    InvalidFrameInterval(f64),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
