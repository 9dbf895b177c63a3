pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "history")]
pub mod history;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage-tools operations
pub type MortgageResult<T> = Result<T, MortgageError>;
