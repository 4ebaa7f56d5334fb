//! TrachyCoin wallet session client with a terminal dashboard.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod store;
pub mod ui;
