pub mod client;
pub mod prompts;
pub mod validation;

pub use client::*;
pub use prompts::*;
pub use validation::*;
