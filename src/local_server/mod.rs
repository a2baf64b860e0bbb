mod config;
mod http;
mod server;
mod target;

pub use config::AppServerConfig;
pub use server::AppServer;
