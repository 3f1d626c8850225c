//! Spending aggregation over flat transaction lists.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    BudgetOverview, Category, CategorySpendingSummary, MonthlyBudget, Period, SpendingBucket,
    SpendingReport, Transaction, TrendPoint,
};

/// Stateless aggregation helpers. Inputs are only borrowed; every call
/// returns freshly built summaries.
pub struct SpendingAggregator;

impl SpendingAggregator {
    /// Groups the period's expenses by category.
    ///
    /// Every category in `categories` gets an entry, zero-filled when it had
    /// no spending. Expenses without a category or pointing at an id missing
    /// from `categories` accumulate under [`SpendingBucket::Unknown`], which is
    /// only present when non-empty.
    pub fn summarize(
        transactions: &[Transaction],
        period: Period,
        categories: &[Category],
    ) -> SpendingReport {
        let known: HashSet<Uuid> = categories.iter().map(|category| category.id).collect();
        let mut entries: BTreeMap<SpendingBucket, CategorySpendingSummary> = categories
            .iter()
            .map(|category| {
                let bucket = SpendingBucket::Category(category.id);
                (bucket, CategorySpendingSummary::empty(bucket))
            })
            .collect();

        for txn in transactions
            .iter()
            .filter(|txn| txn.is_expense() && period.contains(&txn.date))
        {
            let bucket = match txn.category_id {
                Some(id) if known.contains(&id) => SpendingBucket::Category(id),
                _ => SpendingBucket::Unknown,
            };
            entries
                .entry(bucket)
                .or_insert_with(|| CategorySpendingSummary::empty(bucket))
                .record(txn.magnitude());
        }

        SpendingReport::new(period, entries)
    }

    /// Expense totals for the `months` periods ending at `current`, oldest
    /// first. Quiet months are reported as zero, so the result always has
    /// exactly `months` entries.
    pub fn monthly_trend(
        transactions: &[Transaction],
        current: Period,
        months: usize,
    ) -> Vec<TrendPoint> {
        let mut totals: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            let slot = totals.entry(txn.period()).or_insert((0.0, 0));
            slot.0 += txn.magnitude();
            slot.1 += 1;
        }

        (0..months)
            .rev()
            .map(|offset| {
                let period = current.shift(-i32::try_from(offset).unwrap_or(i32::MAX));
                let (total_amount, transaction_count) =
                    totals.get(&period).copied().unwrap_or((0.0, 0));
                TrendPoint {
                    period,
                    label: period.label(),
                    total_amount,
                    transaction_count,
                }
            })
            .collect()
    }

    /// Copies of `categories` with `spent_amount` refreshed from `report`.
    pub fn apply_spent_amounts(categories: &[Category], report: &SpendingReport) -> Vec<Category> {
        categories
            .iter()
            .map(|category| {
                let spent = report
                    .for_category(category.id)
                    .map(|entry| entry.amount)
                    .unwrap_or(0.0);
                category.clone().with_spent(spent)
            })
            .collect()
    }

    /// The month's overall budget against overall spending for the report's
    /// period. A budget stored for a different month is ignored.
    pub fn overview(
        budget: &MonthlyBudget,
        report: &SpendingReport,
        today: NaiveDate,
    ) -> BudgetOverview {
        let total_budget = if budget.period == report.period && budget.validate().is_ok() {
            budget.total_budget
        } else {
            0.0
        };
        let total_spent = report.total();
        let spent_percentage = if total_budget > 0.0 {
            total_spent / total_budget * 100.0
        } else {
            0.0
        };
        let elapsed = report.period.elapsed_days(today);
        let daily_average = if elapsed > 0 {
            total_spent / f64::from(elapsed)
        } else {
            0.0
        };
        BudgetOverview {
            period: report.period,
            total_budget,
            total_spent,
            remaining: total_budget - total_spent,
            spent_percentage,
            daily_average,
        }
    }

    /// The newest `limit` transactions, newest first.
    pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
        let mut sorted = transactions.to_vec();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted.truncate(limit);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn txn(amount: f64, category_id: Option<Uuid>, y: i32, m: u32, d: u32) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            amount,
            category_id,
            merchant: "Merchant".into(),
            note: None,
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    #[test]
    fn sums_absolute_expenses_per_category() {
        let groceries = Category::new("Groceries", 600.0);
        let transactions = vec![
            txn(-50.0, Some(groceries.id), 2024, 3, 1),
            txn(-30.0, Some(groceries.id), 2024, 3, 15),
        ];
        let report =
            SpendingAggregator::summarize(&transactions, march(), std::slice::from_ref(&groceries));
        let entry = report.for_category(groceries.id).unwrap();
        assert_eq!(entry.amount, 80.0);
        assert_eq!(entry.transaction_count, 2);
        assert!(report.unknown().is_none());
    }

    #[test]
    fn skips_income_and_other_periods() {
        let dining = Category::new("Dining", 300.0);
        let transactions = vec![
            txn(-20.0, Some(dining.id), 2024, 3, 3),
            txn(15.0, Some(dining.id), 2024, 3, 4),
            txn(-99.0, Some(dining.id), 2024, 2, 29),
            txn(-10.0, Some(dining.id), 2024, 4, 1),
        ];
        let report =
            SpendingAggregator::summarize(&transactions, march(), std::slice::from_ref(&dining));
        let entry = report.for_category(dining.id).unwrap();
        assert_eq!(entry.amount, 20.0);
        assert_eq!(entry.transaction_count, 1);
    }

    #[test]
    fn unknown_and_missing_categories_share_a_bucket() {
        let rent = Category::new("Rent", 1200.0);
        let deleted = Uuid::new_v4();
        let transactions = vec![
            txn(-25.0, None, 2024, 3, 5),
            txn(-40.0, Some(deleted), 2024, 3, 6),
            txn(-1200.0, Some(rent.id), 2024, 3, 1),
        ];
        let report =
            SpendingAggregator::summarize(&transactions, march(), std::slice::from_ref(&rent));
        let unknown = report.unknown().unwrap();
        assert_eq!(unknown.amount, 65.0);
        assert_eq!(unknown.transaction_count, 2);
        assert_eq!(report.total(), 1265.0);
    }

    #[test]
    fn empty_transactions_yield_zero_summaries() {
        let categories = vec![Category::new("A", 10.0), Category::new("B", 20.0)];
        let report = SpendingAggregator::summarize(&[], march(), &categories);
        assert_eq!(report.len(), 2);
        assert!(report
            .iter()
            .all(|entry| entry.amount == 0.0 && entry.transaction_count == 0));
        assert_eq!(report.total(), 0.0);
    }

    #[test]
    fn report_total_matches_expense_sum() {
        let categories = vec![Category::new("A", 10.0), Category::new("B", 20.0)];
        let transactions = vec![
            txn(-12.25, Some(categories[0].id), 2024, 3, 2),
            txn(-7.75, Some(categories[1].id), 2024, 3, 9),
            txn(-3.0, None, 2024, 3, 10),
            txn(100.0, None, 2024, 3, 11),
            txn(-8.0, Some(categories[1].id), 2024, 1, 11),
        ];
        let expected: f64 = transactions
            .iter()
            .filter(|t| t.is_expense() && march().contains(&t.date))
            .map(|t| t.amount.abs())
            .sum();
        let report = SpendingAggregator::summarize(&transactions, march(), &categories);
        assert_eq!(report.total(), expected);
        assert_eq!(report.transaction_count(), 3);
    }

    #[test]
    fn summarize_does_not_touch_inputs() {
        let categories = vec![Category::new("A", 10.0).with_spent(3.0)];
        let transactions = vec![txn(-5.0, Some(categories[0].id), 2024, 3, 2)];
        let before = (categories.clone(), transactions.clone());
        let _ = SpendingAggregator::summarize(&transactions, march(), &categories);
        assert_eq!((categories, transactions), before);
    }

    #[test]
    fn trend_has_exact_length_oldest_first() {
        let transactions = vec![
            txn(-10.0, None, 2024, 1, 5),
            txn(-20.0, None, 2024, 3, 5),
            txn(-5.0, None, 2024, 3, 6),
            txn(50.0, None, 2024, 3, 7),
        ];
        let trend = SpendingAggregator::monthly_trend(&transactions, march(), 4);
        let labels: Vec<_> = trend.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"]);
        assert_eq!(trend[0].total_amount, 0.0);
        assert_eq!(trend[1].total_amount, 10.0);
        assert_eq!(trend[2].transaction_count, 0);
        assert_eq!(trend[3].total_amount, 25.0);
        assert_eq!(trend[3].transaction_count, 2);

        assert!(SpendingAggregator::monthly_trend(&transactions, march(), 0).is_empty());
        assert_eq!(SpendingAggregator::monthly_trend(&[], march(), 12).len(), 12);
    }

    #[test]
    fn apply_spent_amounts_refreshes_cache() {
        let categories = vec![
            Category::new("Groceries", 600.0).with_spent(999.0),
            Category::new("Fuel", 200.0),
        ];
        let transactions = vec![txn(-45.0, Some(categories[1].id), 2024, 3, 3)];
        let report = SpendingAggregator::summarize(&transactions, march(), &categories);
        let refreshed = SpendingAggregator::apply_spent_amounts(&categories, &report);
        assert_eq!(refreshed[0].spent_amount, 0.0);
        assert_eq!(refreshed[1].spent_amount, 45.0);
        assert_eq!(categories[0].spent_amount, 999.0);
    }

    #[test]
    fn overview_uses_the_monthly_budget() {
        let categories = vec![Category::new("Groceries", 600.0), Category::new("Fuel", 400.0)];
        let transactions = vec![
            txn(-450.0, Some(categories[0].id), 2024, 3, 3),
            txn(-150.0, None, 2024, 3, 4),
        ];
        let report = SpendingAggregator::summarize(&transactions, march(), &categories);
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let budget = MonthlyBudget::new(march(), 1000.0);
        let overview = SpendingAggregator::overview(&budget, &report, today);
        assert_eq!(overview.total_budget, 1000.0);
        assert_eq!(overview.total_spent, 600.0);
        assert_eq!(overview.remaining, 400.0);
        assert_eq!(overview.spent_percentage, 60.0);
        assert_eq!(overview.daily_average, 60.0);
        assert!(!overview.is_over_budget());
        assert!(!overview.is_near_limit());
    }

    #[test]
    fn overview_ignores_budget_for_another_month() {
        let report = SpendingAggregator::summarize(&[], march(), &[]);
        let today = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let april = MonthlyBudget::default_for(march().next());
        let overview = SpendingAggregator::overview(&april, &report, today);
        assert_eq!(overview.total_budget, 0.0);
        assert_eq!(overview.spent_percentage, 0.0);
        assert_eq!(overview.daily_average, 0.0);
    }

    #[test]
    fn trend_window_larger_than_history_stays_in_range() {
        let trend = SpendingAggregator::monthly_trend(&[], march(), 120);
        assert_eq!(trend.len(), 120);
        assert_eq!(trend[0].label, "Apr 2014");
        assert_eq!(trend[119].label, "Mar 2024");
    }

    #[test]
    fn recent_orders_newest_first() {
        let transactions = vec![
            txn(-1.0, None, 2024, 3, 1),
            txn(-2.0, None, 2024, 3, 9),
            txn(-3.0, None, 2024, 3, 5),
        ];
        let recent = SpendingAggregator::recent(&transactions, 2);
        let amounts: Vec<_> = recent.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-2.0, -3.0]);
    }
}
