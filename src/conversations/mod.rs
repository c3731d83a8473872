pub mod driver;
pub mod error;
pub mod handler;
pub mod types;
pub mod utils;

pub use handler::handle_chat;
