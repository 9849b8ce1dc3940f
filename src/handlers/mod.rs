//! HTTP handlers generated per record type.

pub mod record;
pub use record::*;
