pub mod handlers;
mod map;
pub mod server;
pub mod ws;
