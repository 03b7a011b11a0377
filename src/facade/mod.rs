pub mod database;

pub use database::{Database, init_database};
