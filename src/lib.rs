pub mod app;
pub mod auth;
pub mod blog;
pub mod config;
pub mod contact;
pub mod db;
pub mod store;
pub mod utils;
