pub mod catalog;
pub mod chat;
pub mod config;
pub mod database;
pub mod errors;
pub mod raster;
pub mod render;
pub mod server;
pub mod services;
