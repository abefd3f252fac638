pub mod error;
pub mod sleep;
pub mod types;

pub use error::*;
pub use sleep::*;
pub use types::*;
