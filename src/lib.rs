pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod payroll;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
