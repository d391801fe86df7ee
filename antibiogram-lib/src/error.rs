use thiserror::Error;

/// Errors surfaced by the session to the interface layer
#[derive(Debug, Error)]
pub enum AntibiogramError {
    #[error("invalid diameter value `{raw}`")]
    InvalidDiameter { raw: String },

    #[error("insufficient data: {required} measurements required, {found} available")]
    InsufficientData { required: usize, found: usize },

    #[error("no threshold data for antibiotic `{name}`")]
    UnknownAntibiotic { name: String },

    #[error("reference data: {0}")]
    ReferenceData(String),

    #[error("plot: {0}")]
    Plot(String),

    #[error("summary: {0}")]
    Summary(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AntibiogramError>;
