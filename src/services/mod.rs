pub mod dashboard_service;

pub use dashboard_service::{dead_letter_rows, latest_order_row, DashboardRow, DashboardService};
