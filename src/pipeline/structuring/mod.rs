//! Heuristic medication parsing of OCR text.
//!
//! Infallible by construction: any input yields a (possibly empty) list.

pub mod types;
pub mod vocab;
pub mod strategies;
pub mod parser;

pub use types::*;
pub use strategies::*;
pub use parser::*;
pub use vocab::{medication_info, medication_warning};
