pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "returns")]
pub mod returns;

#[cfg(feature = "property")]
pub mod property;

#[cfg(feature = "estimates")]
pub mod estimates;

pub use error::PropertyFinanceError;
pub use types::*;

/// Standard result type for all property-finance operations
pub type PropertyFinanceResult<T> = Result<T, PropertyFinanceError>;
