pub mod grid;
pub mod macros;
pub mod payload;
pub mod time;

pub use grid::*;
pub use time::*;
