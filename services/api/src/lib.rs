pub mod adapters;
pub mod config;
pub mod error;
pub mod housekeeping;
pub mod web;
