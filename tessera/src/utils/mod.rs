mod error;
pub use error::*;

mod id_resolver;
pub use id_resolver::IdResolver;
