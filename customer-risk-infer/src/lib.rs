pub mod base;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod infer;
pub mod models;
pub mod preprocess;
pub mod segments;
pub mod service;
pub mod trace;
pub mod types;
