pub mod handlers;
pub mod middleware;
pub mod organizer;
pub mod routes;
pub mod scanner;
pub mod verify;

pub use routes::create_router;
