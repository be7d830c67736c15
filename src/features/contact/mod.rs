pub mod document_store;
pub mod handler;
pub mod models;
pub mod store;

pub use handler::{create_contact_router, submit_contact};
pub use models::{ContactRequest, ContactResponse, ContactSubmission};
pub use store::{ContactStore, MemoryStore, SqliteStore, build_store};
