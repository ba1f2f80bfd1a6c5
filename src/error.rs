use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    FileNotFound(PathBuf),
    UnsupportedFormat { path: PathBuf, reason: String },
    InvalidReferenceLength(String),
    /// The reference line has zero pixel length, so no scale can be derived.
    DegenerateReference,
    Config { path: PathBuf, reason: String },
    NoImageSelected,
    /// Reading an answer from the terminal failed.
    Input(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found: {}", path.display()),
            Self::UnsupportedFormat { path, reason } => {
                write!(f, "cannot decode image {}: {reason}", path.display())
            }
            Self::InvalidReferenceLength(input) => write!(
                f,
                "invalid reference length {input:?}: expected a positive finite number"
            ),
            Self::DegenerateReference => write!(f, "reference line has zero length"),
            Self::Config { path, reason } => {
                write!(f, "invalid config {}: {reason}", path.display())
            }
            Self::NoImageSelected => write!(f, "no image selected"),
            Self::Input(reason) => write!(f, "cannot read input: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
