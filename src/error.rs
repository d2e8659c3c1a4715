use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServoError {
    #[error("value out of range or unparseable")]
    InvalidArgument,
    #[error("rate control not supported by this driver")]
    NotSupported,
    #[error("driver failure (code {0})")]
    Driver(i32),
    #[error("servo released")]
    Closed,
}
