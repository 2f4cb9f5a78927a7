use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("no channels configured")]
    NoChannels,
    #[error("duplicate channel: {0}")]
    DuplicateChannel(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
