//! Chinese Holiday ICS Core Library
//!
//! This library renders Chinese public holiday arrangements (rest periods and
//! make-up workdays) into iCalendar documents, and reads such documents back.

pub mod error;
pub mod holiday;
pub mod ics;
pub mod tables;
pub mod types;
pub mod validate;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{holiday::*, ics::*, tables::*, types::*, validate::*};
}
