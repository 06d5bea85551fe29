pub mod app;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod modal;
pub mod models;
pub mod parser;
pub mod pomodoro;
pub mod preferences;
pub mod pricing;
pub mod reorder;
pub mod services;
pub mod theme;
pub mod ui;
