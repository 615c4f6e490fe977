pub mod analytics;
pub mod events;
pub mod feed;
pub mod health;
pub mod search;
pub mod similar;
pub mod source;
pub mod static_ui;
