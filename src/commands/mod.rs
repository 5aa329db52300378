pub mod client;
pub mod config;
pub mod plot;
pub mod project;
pub mod server;
pub mod store;
pub mod trajectory;
