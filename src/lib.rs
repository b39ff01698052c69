pub mod config;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod synthetic;
pub mod utils;
pub mod visualization;

#[cfg(feature = "python")]
pub mod bindings;

pub use error::{IemError, Result};
pub use evaluation::{train_and_test, Evaluation};
pub use model::iem::InvertedEncoding1D;
pub use model::{IemParams, StimulusMode};
