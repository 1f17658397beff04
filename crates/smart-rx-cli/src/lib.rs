//! Command-line front end for the prescription parser.
//!
//! Reads orders from arguments, a file or stdin and renders the parsed
//! batch as text, JSON or CSV.

pub mod input;
pub mod output;

pub use input::*;
pub use output::*;
