mod error;
pub use error::PmtilesError;

mod store;
pub use store::PmtilesStore;
