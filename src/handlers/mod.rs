// src/handlers/mod.rs

pub mod answers;
pub mod forum;
pub mod participant;
pub mod session;
