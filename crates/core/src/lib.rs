//! Auth dashboard core types and utilities

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{ApiConfig, DashboardConfig, DEFAULT_BASE_URL};
pub use error::{CoreError, CoreResult};
pub use types::{Session, User};
pub use validation::{ValidateConfig, ValidationError};
