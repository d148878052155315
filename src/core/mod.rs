// src/core/mod.rs — Refinement loop core

pub mod controller;
pub mod cost;
pub mod fallback;
pub mod filters;
pub mod types;
