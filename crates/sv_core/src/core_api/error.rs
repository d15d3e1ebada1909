use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    NotFound,
    Collision,
    Deserialize,
    Serialize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn io(action: &str, path: &Path, err: io::Error) -> Self {
        let code = if err.kind() == io::ErrorKind::NotFound {
            CoreErrorCode::NotFound
        } else {
            CoreErrorCode::Io
        };
        Self::new(code, format!("failed to {action} {}: {err}", path.display()))
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
