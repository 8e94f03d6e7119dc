pub mod app;
pub mod auth;
pub mod config;
pub mod cycle;
pub mod db;
pub mod error;
pub mod images;
pub mod response;
pub mod state;
pub mod storage;
