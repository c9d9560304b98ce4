pub mod session_model;
pub mod session_store;

mod session_store_tests;

pub use session_model::SessionUpdate;
pub use session_store::BudgetSession;
