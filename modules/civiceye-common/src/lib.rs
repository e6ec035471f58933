pub mod config;
pub mod error;
pub mod routing;
pub mod types;

pub use config::{IntakeConfig, Vocabulary};
pub use error::CivicEyeError;
pub use routing::{authority_for, Authority};
pub use types::*;
