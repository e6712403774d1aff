pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod render;
pub mod storage;
