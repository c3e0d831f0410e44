// src/utils/mod.rs
pub mod fs;
pub mod util;

pub use fs::atomic_write;
