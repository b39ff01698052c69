use thiserror::Error;

#[derive(Debug, Error)]
pub enum IemError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Label {label} is outside the feature range [{range_start}, {range_stop})")]
    LabelOutOfRange {
        label: f64,
        range_start: f64,
        range_stop: f64,
    },

    #[error("Model has not been fitted, call fit() first")]
    NotFitted,

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Score is undefined: labels have no spread around their mean")]
    DegenerateScore,

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IemError>;
