/// Common error type for the dashboard core.
#[derive(thiserror::Error, Debug)]
pub enum SondeError {
    #[error("malformed task snapshot: {0}")]
    Snapshot(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("credential cache: {0}")]
    Credentials(#[from] std::io::Error),
}

pub type SondeResult<T> = Result<T, SondeError>;
