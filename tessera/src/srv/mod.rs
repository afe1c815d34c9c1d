mod server;
pub use server::{Server, map_internal_error, new_server, router};

mod tiles;
mod tiles_info;
