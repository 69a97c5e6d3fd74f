// src/lib.rs
pub mod batch;
pub mod error;
pub mod export;
pub mod io;
pub mod processing;
pub mod render;
pub mod utils;

pub use error::{Error, Result};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
