pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod rate_limit;
pub mod render;
pub mod tmdb;
