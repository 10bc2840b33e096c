//! Report module - console rendering, text plots and JSON export

pub mod export;
pub mod plot;
pub mod summary;

pub use export::*;
pub use plot::*;
pub use summary::*;
