pub mod budget_calculator;
pub mod metrics_model;


pub use budget_calculator::{
    category_with_expenses, month_summary, percentage, progress_class, OVER_THRESHOLD,
    WARN_THRESHOLD,
};
pub use metrics_model::{CategoryWithExpenses, MonthSummary, ProgressClass};
