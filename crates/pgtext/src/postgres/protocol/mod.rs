//! pgoutput wire protocol
//!
//! Message types and a bounds-checked decoder for the pgoutput logical
//! decoding plugin.

pub mod decoder;
pub mod message;

pub use decoder::*;
pub use message::*;
