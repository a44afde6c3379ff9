// src/utils/mod.rs

pub mod form;
pub mod uploads;
