mod server;
mod server_config;

pub use server::{SendReceipt, Server};
pub use server_config::ServerConfig;
