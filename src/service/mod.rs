//! CrudService: one storage operation per request using the safe SQL builder.

mod crud;
pub use crud::CrudService;
