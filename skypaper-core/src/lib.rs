pub mod assign;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod ipc;
pub mod models;
pub mod paths;
pub mod satellite;
