pub mod result;

pub use result::{QueryOutcome, QueryResult, Row};
