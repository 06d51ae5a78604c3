// src/services/mod.rs
pub mod relay;
pub mod upstream;
