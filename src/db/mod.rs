mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::{Database, DEFAULT_OP_TIMEOUT};
pub use models::{NewReading, Reading};
