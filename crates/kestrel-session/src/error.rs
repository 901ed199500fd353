use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Device command failed: {0}")]
    Channel(String),

    #[error("Unrecognized capture level '{0}'. Accepted values: [Device, Application]")]
    InvalidCaptureLevel(String),

    #[error("No {0} configured for this session")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Core(#[from] kestrel_core::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Channel(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
