pub mod crud;
pub mod settings;

pub use crud::*;
pub use settings::*;
