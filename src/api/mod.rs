//! Function Pack Cloud API Module
//! REST surface for invoking pack functions over HTTP

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
