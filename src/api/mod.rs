pub mod handlers;
pub mod lyric_handlers;
pub mod routes;

pub use handlers::*;
pub use lyric_handlers::*;
pub use routes::*;
