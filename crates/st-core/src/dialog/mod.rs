//! Multi-turn diagnostic dialog.

pub mod controller;
pub mod reply;
pub mod session;
pub mod store;

pub use controller::DialogController;
pub use reply::Reply;
pub use session::{DialogState, Session};
pub use store::SessionStore;
