use std::{error, fmt, io};

use crate::atom::Fourcc;

/// Type alias for the result of fallible operations of this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while reading or writing MPEG-4 audio files.
#[derive(Debug)]
pub enum ErrorKind {
    /// An error kind indicating that an atom could not be found. Contains the atom's identifier.
    AtomNotFound(Fourcc),
    /// An error kind indicating that an IO error has occurred. Contains the original `io::Error`.
    Io(io::Error),
    /// An error kind indicating that the input violates the call contract, e.g. an empty audio
    /// stream, an image that fails type sniffing, or a chapter starting past the end of the audio.
    InvalidInput,
    /// An error kind indicating that an internal inconsistency was detected while assembling the
    /// output. No output is produced when this occurs.
    Internal,
    /// An error kind indicating that no track with an audio handler was found.
    NoAudioTrack,
    /// An error kind indicating that an error occurred during parsing.
    Parsing,
    /// An error kind indicating that the size of an atom table doesn't match its declared length.
    SizeMismatch,
    /// An error kind indicating an unknown version of a versioned atom. Contains the version.
    UnknownVersion(u8),
}

/// A structure able to represent any error that may occur while performing operations of this
/// crate.
pub struct Error {
    /// The kind of error.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: String,
}

impl Error {
    /// Creates a new `Error` of the kind and description.
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into() }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::new(ErrorKind::Io(err), "IO error")
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.description)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.description)
    }
}
