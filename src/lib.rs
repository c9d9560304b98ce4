pub mod db;

pub mod errors;
pub mod schema;

pub mod categories;
pub mod expenses;
pub mod metrics;
pub mod months;
pub mod session;

pub use metrics::*;
pub use session::*;
