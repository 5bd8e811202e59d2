//! REST API and SSE surface

pub mod handlers;
pub mod library;
pub mod queue;
pub mod server;
pub mod sse;

pub use handlers::StatusResponse;
pub use server::{build_router, run, AppContext};
