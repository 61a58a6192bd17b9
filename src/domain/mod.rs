//! Domain layer - pool/volume records and port definitions
//!
//! This module defines the records backends populate and the traits
//! (ports) that backends and process runners implement.

pub mod model;
pub mod ports;

pub use model::*;
pub use ports::*;
