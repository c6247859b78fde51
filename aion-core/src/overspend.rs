//! Overspend Detection
//!
//! Pure comparison of a budget category's spent total against its
//! allocation. Called after every recorded expense; the alert rides back to
//! the model inside the tool result so the final answer can mention it.

use serde::{Deserialize, Serialize};

use crate::store::BudgetCategory;

/// Raised when a category's spending exceeds its allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverspendAlert {
    pub category: String,
    pub allocated: f64,
    pub spent: f64,
    /// How far over the allocation the category is.
    pub over_by: f64,
}

/// Check one category. Spending exactly at the allocation is not an
/// overspend.
pub fn check_overspend(category: &BudgetCategory) -> Option<OverspendAlert> {
    if category.spent > category.allocated {
        Some(OverspendAlert {
            category: category.title.clone(),
            allocated: category.allocated,
            spent: category.spent,
            over_by: category.spent - category.allocated,
        })
    } else {
        None
    }
}
