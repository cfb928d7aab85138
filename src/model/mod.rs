pub mod common;
pub mod filter;
pub mod lyric;
pub mod song;

pub use common::*;
pub use filter::*;
pub use lyric::*;
pub use song::*;
