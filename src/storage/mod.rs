// src/storage/mod.rs

pub mod results;
pub mod sessions;
