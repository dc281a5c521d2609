pub mod auth;
pub mod config;
pub mod error;
pub mod firestore;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
