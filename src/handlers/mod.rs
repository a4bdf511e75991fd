// src/handlers/mod.rs

pub mod quiz;
pub mod quiz_record;
pub mod take;
