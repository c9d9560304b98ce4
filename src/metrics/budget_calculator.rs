use crate::categories::Category;
use crate::expenses::Expense;
use crate::metrics::metrics_model::{CategoryWithExpenses, MonthSummary, ProgressClass};
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub const WARN_THRESHOLD: i32 = 70;
pub const OVER_THRESHOLD: i32 = 90;

/// Percentage of budget consumed, rounded to the nearest integer. A zero
/// budget reports 0%, not infinity; the result is unbounded above.
pub fn percentage(spent: Decimal, budget_limit: Decimal) -> i32 {
    if budget_limit.is_zero() {
        return 0;
    }

    (spent / budget_limit * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(i32::MAX)
}

pub fn progress_class(percentage: i32) -> ProgressClass {
    if percentage < WARN_THRESHOLD {
        ProgressClass::Ok
    } else if percentage < OVER_THRESHOLD {
        ProgressClass::Warn
    } else {
        ProgressClass::Over
    }
}

/// Rolls up a category with the expenses already filtered to it. Validation
/// of amounts happens at mutation time; negative totals are propagated as-is.
pub fn category_with_expenses(category: Category, expenses: &[Expense]) -> CategoryWithExpenses {
    let spent: Decimal = expenses.iter().map(|expense| expense.amount_decimal()).sum();
    let percentage = percentage(spent, category.budget_limit_decimal());

    CategoryWithExpenses {
        category,
        spent,
        percentage,
    }
}

/// Month snapshot: total spending over the given categories and the balance
/// against revenue, unclamped.
pub fn month_summary(revenue: Decimal, categories: Vec<CategoryWithExpenses>) -> MonthSummary {
    let total_expenses: Decimal = categories.iter().map(|category| category.spent).sum();
    let balance = revenue - total_expenses;

    MonthSummary {
        revenue,
        total_expenses,
        balance,
        categories,
    }
}
