use std::fmt;

#[derive(Debug)]
pub enum BrandbookError {
    EmptyBrandName,
    InvalidProfile(String),
    Capture(String),
    Asset(String),
    Io(std::io::Error),
}

impl fmt::Display for BrandbookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandbookError::EmptyBrandName => {
                write!(f, "brand profile has no name; nothing to export")
            }
            BrandbookError::InvalidProfile(message) => {
                write!(f, "invalid brand profile: {}", message)
            }
            BrandbookError::Capture(message) => write!(f, "mockup capture failed: {}", message),
            BrandbookError::Asset(message) => write!(f, "asset error: {}", message),
            BrandbookError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for BrandbookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrandbookError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BrandbookError {
    fn from(value: std::io::Error) -> Self {
        BrandbookError::Io(value)
    }
}
