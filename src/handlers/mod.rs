// handlers/mod.rs - one module per dashboard endpoint
pub mod dead_letters;
pub mod health;
pub mod home;
pub mod latest_orders;
pub mod restaurants;
pub mod utils;
