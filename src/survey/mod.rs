// src/survey/mod.rs

//! Question assembly and result bookkeeping for one listening-test session.

pub mod answers;
pub mod assembler;
pub mod finalizer;
pub mod inventory;
pub mod validation;
