//! Domain models for the smart-rx parser.

mod drug;
mod result;

pub use drug::*;
pub use result::*;
