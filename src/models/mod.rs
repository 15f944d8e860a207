// src/models/mod.rs

pub mod attempt;
pub mod career;
pub mod category;
pub mod question;
pub mod user;
