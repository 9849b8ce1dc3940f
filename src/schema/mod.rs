//! Record capability trait, schema descriptors and the resolved allow-list.

pub mod naming;
pub mod resolved;
pub mod types;
pub mod validator;

pub use naming::*;
pub use resolved::*;
pub use types::*;
pub use validator::*;
