// src/pipeline/mod.rs

pub mod case;
pub mod property;
