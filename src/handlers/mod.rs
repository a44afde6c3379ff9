// src/handlers/mod.rs

pub mod course;
pub mod dashboard;
pub mod page;
pub mod question;
pub mod solution;
pub mod tag;
