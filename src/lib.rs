pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod ids;
pub mod layout;
pub mod logging;
pub mod shell;
pub mod store;
pub mod tab;
