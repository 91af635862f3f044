pub mod episode;
pub mod extracted;

pub use episode::*;
pub use extracted::*;
