pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod forest;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
