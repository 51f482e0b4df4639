pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod routes;
pub mod seed;
pub mod store;
pub mod telemetry;
pub mod utils;
pub mod view;

pub use error::{ForumError, ForumResult};
pub use store::ForumStore;
