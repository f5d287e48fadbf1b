//! Bookshelf application library
//!
//! Wires the books module onto the kernel, the record store, and the HTTP
//! server.

pub mod app;
pub mod modules;

pub use app::App;
pub use modules::books::models::Book;
pub use modules::books::service::{BookError, BookService};
