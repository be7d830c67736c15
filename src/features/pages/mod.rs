pub mod handler;
pub mod models;
pub mod render;

pub use handler::create_pages_router;
pub use models::SiteContent;
pub use render::PageRenderer;
