//! Carries a process exit code alongside an error message, so `main()` can
//! decide how the process terminates instead of commands calling
//! `std::process::exit()` directly.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<std::io::Error> for ExitError {
    fn from(err: std::io::Error) -> Self {
        Self::new(1, format!("io error: {err}"))
    }
}

impl From<serde_json::Error> for ExitError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(1, format!("malformed json: {err}"))
    }
}
