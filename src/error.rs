use std::fmt;
use std::path::PathBuf;

/// Everything that stops a run. The `Display` texts are the messages printed
/// after `Error: ` on stderr, so scripts matching on them keep working.
#[derive(Debug)]
pub enum Error {
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
    StationsSectionMissing,
    ConnectionsSectionMissing,
    InvalidCoordinates(String),
    InvalidName,
    DuplicateName(String),
    DuplicateCoordinates(String, String),
    InvalidConnection(String),
    DuplicateConnection(String, String),
    TooManyStations(usize),
    StationNotFound,
    SameStartAndEnd,
    InvalidTrainCount,
    NoPathFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read { path, source } => write!(f, "could not read {}: {}", path.display(), source),
            Error::Write { path, source } => write!(f, "could not write {}: {}", path.display(), source),
            Error::StationsSectionMissing => write!(f, "stations section missing"),
            Error::ConnectionsSectionMissing => write!(f, "connections section missing"),
            Error::InvalidCoordinates(name) => write!(f, "Invalid Coordinates: {}", name),
            Error::InvalidName => write!(f, "Invalid name"),
            Error::DuplicateName(name) => write!(f, "duplicate station name--{}", name),
            Error::DuplicateCoordinates(first, second) => {
                write!(f, "duplicate coordinates: {} and {}", first, second)
            }
            Error::InvalidConnection(line) => write!(f, "invalid connection: {}", line),
            Error::DuplicateConnection(a, b) => write!(f, "duplicate connection--{} and {}", a, b),
            Error::TooManyStations(n) => write!(f, "more than 10,000 stations--{}", n),
            Error::StationNotFound => write!(f, "Start or end station not found."),
            Error::SameStartAndEnd => write!(f, "start and end station are the same"),
            Error::InvalidTrainCount => write!(f, "number of trains must be positive int"),
            Error::NoPathFound => write!(f, "no path found"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { source, .. } | Error::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
