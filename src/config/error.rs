use std::fmt;

/// A convenient result type wrapping [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    EmptyLodLevels,
    LodDistanceOrder { index: usize },
    LodStep { index: usize, lod: u8 },
    MissingCollisionLod,
    RegionOrder { index: usize },
    InvalidField { field: &'static str },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyLodLevels => write!(f, "lod level list is empty"),
            Error::LodDistanceOrder { index } => write!(
                f,
                "lod level {} does not increase the visible distance of the previous level",
                index
            ),
            Error::LodStep { index, lod } => write!(
                f,
                "lod level {} (lod {}) has a vertex step that does not divide the sample grid",
                index, lod
            ),
            Error::MissingCollisionLod => {
                write!(f, "no lod level is flagged for collision")
            }
            Error::RegionOrder { index } => write!(
                f,
                "surface region {} is not sorted descending by height threshold",
                index
            ),
            Error::InvalidField { field } => write!(f, "invalid value for '{}'", field),
            Error::Io(err) => write!(f, "failed to read config: {}", err),
            Error::Parse(err) => write!(f, "failed to parse config: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Parse(value)
    }
}
