// src/lib.rs — Library root for leadloop

pub mod advisor;
pub mod cli;
pub mod core;
pub mod infra;
pub mod provider;
pub mod search;
pub mod util;
