pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod render;
