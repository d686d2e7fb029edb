pub mod ack_manager;
pub mod base_connection;
pub mod circuit_config;
pub mod inbound_window;
pub mod ping_config;
pub mod ping_manager;
pub mod throttle;
pub mod timer;
