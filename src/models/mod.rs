// src/models/mod.rs

pub mod course;
pub mod page;
pub mod question;
pub mod solution;
pub mod stats;
pub mod tag;
