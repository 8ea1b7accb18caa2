//! Errors generated by the code generator.
use thiserror::Error as ThisError;

/// Convenience wrapper to represent success or meaningful generation error.
pub type RtlResult<T> = std::result::Result<T, Error>;

/// Standard error type for the generator. Boxed so that results stay small.
pub struct Error {
    kind: Box<ErrorKind>,
    /// Name of the module being emitted when the error was raised.
    module: Option<String>,
    /// Optional message printed after the main error.
    post_msg: Option<String>,
}

/// The different kinds of fatal failures.
#[derive(ThisError, Debug)]
pub enum ErrorKind {
    /// A construct the requested backend cannot express.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// Badly formed machine-generated input.
    #[error("Malformed input: {0}")]
    Malformed(String),

    /// A capability that is not compiled into this build.
    #[error("Missing feature: {0}")]
    MissingFeature(String),

    /// The design or library file could not be loaded.
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// Failure while writing generated text.
    #[error("Write error: {0}")]
    WriteError(String),

    /// Miscellaneous error message
    #[error("{0}")]
    Misc(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "[{}] ", module)?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(post) = &self.post_msg {
            write!(f, "\n{}", post)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Box::new(kind),
            module: None,
            post_msg: None,
        }
    }

    pub fn unsupported<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Unsupported(msg.to_string()))
    }
    pub fn malformed<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Malformed(msg.to_string()))
    }
    pub fn missing_feature<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::MissingFeature(msg.to_string()))
    }
    pub fn invalid_file<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::InvalidFile(msg.to_string()))
    }
    pub fn write_error<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::WriteError(msg.to_string()))
    }
    pub fn misc<S: ToString>(msg: S) -> Self {
        Self::new(ErrorKind::Misc(msg.to_string()))
    }

    /// Attach the name of the module being emitted. The innermost module wins.
    pub fn with_module<S: ToString>(mut self, module: S) -> Self {
        if self.module.is_none() {
            self.module = Some(module.to_string());
        }
        self
    }

    pub fn with_post_msg(mut self, msg: Option<String>) -> Self {
        self.post_msg = msg;
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(*self.kind, ErrorKind::Unsupported(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(*self.kind, ErrorKind::Malformed(_))
    }

    pub fn is_missing_feature(&self) -> bool {
        matches!(*self.kind, ErrorKind::MissingFeature(_))
    }
}

// Conversions from other error types to our error type so that
// we can use `?` in all the places.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::write_error(format!("IO Error: {}", e))
    }
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Error::write_error("formatting failed")
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::invalid_file(format!("JSON: {}", e))
    }
}
