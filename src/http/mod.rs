pub mod error;
pub mod guilds;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod shop;
pub mod social;
pub mod workouts;

pub use routes::build_router;
