pub mod config;
pub mod engine;
pub mod mapping;
pub mod window;
