//! Route builders: record routes per resource, plus common health routes.

pub mod common;
pub mod record;

pub use common::*;
pub use record::*;
