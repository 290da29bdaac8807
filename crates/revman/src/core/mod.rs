//! Core abstractions for review processing
//!
//! Error taxonomy, logging, styling roles and the collaborator traits the
//! command pipeline is written against.

pub mod chumsky_utils;
mod error;
mod generator;
pub mod logging;
mod parser;
mod style;

pub use error::*;
pub use generator::*;
pub use logging::*;
pub use parser::*;
pub use style::*;
