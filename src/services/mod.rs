// src/services/mod.rs

pub mod content;
pub mod grouping;
pub mod lifecycle;
pub mod queries;
pub mod tags;
