pub mod config_store;
pub mod defaults;
pub mod secrets;
pub mod service;
pub mod transport;
