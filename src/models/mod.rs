pub mod category;
pub mod server;
pub mod user;
