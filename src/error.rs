use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid format specifier: {spec:?}")]
    InvalidFormat { spec: String },
    #[error("failed to write chart: {0}")]
    Io(#[from] std::io::Error),
    #[error("drawing backend failed: {0}")]
    Drawing(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrubberError {
    #[error("scrubber needs at least one value")]
    EmptyValues,
    #[error("initial index {initial} out of range for {len} values")]
    InitialOutOfRange { initial: usize, len: usize },
}
