//! cs-core: shared foundation for ctrlsys.
//!
//! Contains:
//! - numeric (float validation helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
