mod error;
pub use error::MbtilesError;

mod metadata;

mod store;
pub use store::MbtilesStore;
