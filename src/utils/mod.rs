// src/utils/mod.rs

pub mod extract;
pub mod guard;
pub mod id;
pub mod jwt;
