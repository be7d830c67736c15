pub mod handler;

pub use handler::{create_settings_router, get_settings};
