use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Row {row}: missing required column '{column}'")]
    MissingField { row: usize, column: &'static str },

    #[error("Row {row}: column '{column}' is not a number: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;
