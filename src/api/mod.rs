pub mod handlers;
pub mod request_id;
pub mod response;
mod routes;

pub use routes::create_router;
