// src/models/mod.rs

pub mod answer;
pub mod forum;
pub mod result;
pub mod session;
pub mod template;
