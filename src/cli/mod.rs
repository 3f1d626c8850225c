//! Terminal rendering of the dashboard for one month.

pub mod output;
pub mod table;

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::ConfigManager;
use crate::core::{format_currency, format_percentage};
use crate::dashboard::{Dashboard, DashboardSettings, LoadOutcome, Snapshot};
use crate::domain::{Period, SpendingBucket};
use crate::errors::Result;
use crate::notify::ConsoleSink;
use crate::storage::{InMemoryBudgetStore, InMemoryCategoryStore, InMemoryTransactionStore};

use table::{Table, TableColumn};

const UNCATEGORIZED: &str = "Uncategorized";

/// Loads the fixture-backed dashboard and prints it. The optional first
/// argument selects the month as `YYYY-MM`; the current month is the default.
pub async fn run_cli(args: Vec<String>) -> Result<()> {
    let period = match args.first() {
        Some(raw) => raw.parse::<Period>()?,
        None => Period::current(),
    };
    let config = ConfigManager::new()?.load()?;

    let categories = Arc::new(InMemoryCategoryStore::seeded(config.latency.clone())?);
    let transactions = Arc::new(InMemoryTransactionStore::seeded(config.latency.clone())?);
    let budgets = Arc::new(InMemoryBudgetStore::seeded(config.latency.clone())?);
    let settings = DashboardSettings::from_config(&config, period)?;
    let mut dashboard = Dashboard::new(
        categories,
        transactions,
        budgets,
        Arc::new(ConsoleSink),
        settings,
    );

    output::info(format!("Loading budget dashboard for {}…", period.label()));
    if let LoadOutcome::Failed(err) = dashboard.load().await {
        return Err(err);
    }
    if let Some(snapshot) = dashboard.snapshot() {
        render(snapshot);
    }
    Ok(())
}

fn render(snapshot: &Snapshot) {
    let names: HashMap<Uuid, &str> = snapshot
        .categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    render_overview(snapshot);
    render_categories(snapshot);
    render_recent(snapshot, &names);
    render_trend(snapshot);
}

fn render_overview(snapshot: &Snapshot) {
    let overview = &snapshot.overview;
    output::section(format!("Budget overview: {}", snapshot.period.label()));
    output::info(format!("Total budget:  {}", format_currency(overview.total_budget)));
    output::info(format!(
        "Spent:         {} ({})",
        format_currency(overview.total_spent),
        format_percentage(overview.spent_percentage)
    ));
    output::info(format!("Remaining:     {}", format_currency(overview.remaining)));
    output::info(format!("Daily average: {}", format_currency(overview.daily_average)));
    output::info(format!("Status:        {}", output::status_label(overview.status())));
    if overview.is_over_budget() {
        output::error("You have spent more than your total budget this month.");
    } else if overview.is_near_limit() {
        output::warning("You are close to your total budget this month.");
    }
}

fn render_categories(snapshot: &Snapshot) {
    output::section("Categories");
    let mut table = Table::new(vec![
        TableColumn::left("Category").max_width(24),
        TableColumn::right("Budget"),
        TableColumn::right("Spent"),
        TableColumn::right("Used"),
        TableColumn::left("Status"),
    ]);
    for category in &snapshot.categories {
        let used = category
            .percentage()
            .map(format_percentage)
            .unwrap_or_else(|| "-".into());
        table.push_row(vec![
            category.name.clone(),
            format_currency(category.budget_amount),
            format_currency(category.spent_amount),
            used,
            output::status_label(category.status()),
        ]);
    }
    if let Some(unknown) = snapshot.report.get(SpendingBucket::Unknown) {
        table.push_row(vec![
            UNCATEGORIZED.into(),
            "-".into(),
            format_currency(unknown.amount),
            "-".into(),
            String::new(),
        ]);
    }
    output::info(table.render());
}

fn render_recent(snapshot: &Snapshot, names: &HashMap<Uuid, &str>) {
    output::section("Recent transactions");
    if snapshot.recent.is_empty() {
        output::info("No transactions yet.");
        return;
    }
    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::left("Merchant").max_width(24),
        TableColumn::left("Category").max_width(18),
        TableColumn::right("Amount"),
    ]);
    for txn in &snapshot.recent {
        let category = txn
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or(UNCATEGORIZED);
        table.push_row(vec![
            txn.date.format("%Y-%m-%d").to_string(),
            txn.merchant.clone(),
            category.to_string(),
            format_currency(txn.amount),
        ]);
    }
    output::info(table.render());
}

fn render_trend(snapshot: &Snapshot) {
    output::section("Monthly trend");
    let mut table = Table::new(vec![
        TableColumn::left("Month"),
        TableColumn::right("Spent"),
        TableColumn::right("Transactions"),
    ]);
    for point in &snapshot.trend {
        table.push_row(vec![
            point.label.clone(),
            format_currency(point.total_amount),
            point.transaction_count.to_string(),
        ]);
    }
    output::info(table.render());
}
