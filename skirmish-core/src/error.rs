use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenomeError {
    LengthMismatch { left: usize, right: usize },
    PopulationTooSmall { size: usize, min: usize },
}

impl fmt::Display for GenomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { left, right } => write!(
                f,
                "cannot cross genomes of different length: {left} vs {right}"
            ),
            Self::PopulationTooSmall { size, min } => {
                write!(f, "population of {size} is below the minimum of {min}")
            }
        }
    }
}

impl std::error::Error for GenomeError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    Backend(String),
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "genome store failure: {msg}"),
            Self::Corrupt(msg) => write!(f, "genome store holds corrupt data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug)]
pub enum EngineError {
    Genome(GenomeError),
    Store(StoreError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genome(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Genome(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<GenomeError> for EngineError {
    fn from(err: GenomeError) -> Self {
        Self::Genome(err)
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
