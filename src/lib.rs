pub mod discretization;
pub mod error;
pub mod numerics;
pub mod physics;
pub mod processing;

pub use error::{ConfigurationError, GfdmError, InputError, NumericalError};
