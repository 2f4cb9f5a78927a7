use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("history pattern must contain exactly one '*': {0}")]
    Pattern(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BusError>;
