// Copyright @yucwang 2026

use std::fmt;

#[derive(Debug)]
pub enum ObserveError {
    /// The camera is not attached to a scene.
    NotConnected,
    InvalidConfiguration(String),
    /// A camera variant did not supply a required hook.
    NotImplemented(&'static str),
    SamplingFailure(String),
    Io(std::io::Error),
    Image(String),
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserveError::NotConnected => write!(f, "camera is not connected to a scene"),
            ObserveError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            ObserveError::NotImplemented(what) => write!(f, "{} has not been implemented for this camera", what),
            ObserveError::SamplingFailure(msg) => write!(f, "pixel sampling failed: {}", msg),
            ObserveError::Io(err) => write!(f, "io error: {}", err),
            ObserveError::Image(msg) => write!(f, "image error: {}", msg),
        }
    }
}

impl std::error::Error for ObserveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObserveError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ObserveError {
    fn from(err: std::io::Error) -> Self {
        ObserveError::Io(err)
    }
}

pub type ObserveResult<T> = Result<T, ObserveError>;

pub(crate) fn invalid<T>(msg: impl Into<String>) -> ObserveResult<T> {
    Err(ObserveError::InvalidConfiguration(msg.into()))
}
