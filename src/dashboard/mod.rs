//! Dashboard controller: loads every store, keeps the last good snapshot,
//! and drives the alert evaluator after every refresh.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::core::services::{
    AlertEvaluator, AlertStore, BudgetAlert, BudgetService, CategoryRemoval, CategoryService,
    SpendingAggregator, TransactionService,
};
use crate::domain::{
    BudgetOverview, Category, MonthlyBudget, Period, SpendingReport, Transaction,
    TransactionDraft, TransactionKind, TrendPoint,
};
use crate::errors::{BudgetError, Result};
use crate::notify::NotificationSink;
use crate::storage::{BudgetStore, CategoryStore, TransactionStore};

/// Knobs the dashboard needs from [`Config`] plus the month on display.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub period: Period,
    pub recent_limit: usize,
    pub trend_months: usize,
    pub alert_max_age: chrono::Duration,
}

impl DashboardSettings {
    /// Fails with [`BudgetError::Config`] when `config` is out of range.
    pub fn from_config(config: &Config, period: Period) -> Result<Self> {
        Ok(Self {
            period,
            recent_limit: config.recent_limit,
            trend_months: config.trend_months,
            alert_max_age: config.alert_max_age()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardState {
    Idle,
    Loading,
    Ready,
    /// The last load failed. Any earlier snapshot is still available.
    Failed { message: String },
}

impl DashboardState {
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for DashboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Ready => f.write_str("ready"),
            Self::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

/// Everything derived from one successful load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub period: Period,
    /// Categories with `spent_amount` refreshed for `period`.
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    /// Overall limit for `period`, the default when none is stored.
    pub budget: MonthlyBudget,
    pub report: SpendingReport,
    pub recent: Vec<Transaction>,
    pub trend: Vec<TrendPoint>,
    pub overview: BudgetOverview,
    pub loaded_at: DateTime<Utc>,
}

/// Raw store contents fetched for one load.
#[derive(Debug, Clone)]
pub struct FetchedData {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub budget: MonthlyBudget,
}

/// Generation number handed out by [`Dashboard::begin_load`]. Only the
/// newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Applied { alerts: Vec<BudgetAlert> },
    /// A newer load was started after this one; the result was dropped.
    Stale,
    Failed(BudgetError),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn alerts(&self) -> &[BudgetAlert] {
        match self {
            Self::Applied { alerts } => alerts,
            _ => &[],
        }
    }
}

pub struct Dashboard<C, T, B> {
    categories: Arc<C>,
    transactions: Arc<T>,
    budgets: Arc<B>,
    sink: Arc<dyn NotificationSink>,
    alerts: AlertStore,
    settings: DashboardSettings,
    generation: u64,
    state: DashboardState,
    snapshot: Option<Snapshot>,
}

impl<C, T, B> Dashboard<C, T, B>
where
    C: CategoryStore,
    T: TransactionStore,
    B: BudgetStore,
{
    pub fn new(
        categories: Arc<C>,
        transactions: Arc<T>,
        budgets: Arc<B>,
        sink: Arc<dyn NotificationSink>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            categories,
            transactions,
            budgets,
            sink,
            alerts: AlertStore::new(),
            settings,
            generation: 0,
            state: DashboardState::Idle,
            snapshot: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn period(&self) -> Period {
        self.settings.period
    }

    pub fn alert_store(&self) -> &AlertStore {
        &self.alerts
    }

    /// Starts a new load generation. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = DashboardState::Loading;
        LoadTicket(self.generation)
    }

    /// Fetches all stores. Any failure fails the whole fetch so nothing is
    /// ever aggregated from partial data.
    pub async fn fetch(&self) -> Result<FetchedData> {
        let (categories, transactions, budget) = tokio::try_join!(
            self.categories.list_all(),
            self.transactions.list_all(),
            BudgetService::for_period(self.budgets.as_ref(), self.settings.period)
        )?;
        Ok(FetchedData {
            categories,
            transactions,
            budget,
        })
    }

    /// Applies the result of the load identified by `ticket`.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<FetchedData>) -> LoadOutcome {
        self.finish_load_at(ticket, result, Utc::now())
    }

    pub fn finish_load_at(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedData>,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if ticket.0 != self.generation {
            warn!(
                "discarding stale load #{} (latest is #{})",
                ticket.0, self.generation
            );
            return LoadOutcome::Stale;
        }

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                error!("dashboard load #{} failed: {err}", ticket.0);
                let message = err.user_message();
                self.sink.show_error(&message);
                self.state = DashboardState::Failed { message };
                return LoadOutcome::Failed(err);
            }
        };

        let period = self.settings.period;
        let report = SpendingAggregator::summarize(&data.transactions, period, &data.categories);
        let categories = SpendingAggregator::apply_spent_amounts(&data.categories, &report);

        let previous = self
            .snapshot
            .as_ref()
            .filter(|snapshot| snapshot.period == period)
            .map(|snapshot| snapshot.categories.as_slice())
            .unwrap_or(&[]);
        let alerts = AlertEvaluator::evaluate(&categories, previous, &mut self.alerts, now);
        AlertEvaluator::dispatch(&alerts, self.sink.as_ref());

        let overview = SpendingAggregator::overview(&data.budget, &report, now.date_naive());
        let recent = SpendingAggregator::recent(&data.transactions, self.settings.recent_limit);
        let trend =
            SpendingAggregator::monthly_trend(&data.transactions, period, self.settings.trend_months);

        info!(
            "dashboard load #{} applied for {}: {} categories, {} transactions, {} alert(s)",
            ticket.0,
            period,
            categories.len(),
            data.transactions.len(),
            alerts.len()
        );
        self.snapshot = Some(Snapshot {
            period,
            categories,
            transactions: data.transactions,
            budget: data.budget,
            report,
            recent,
            trend,
            overview,
            loaded_at: now,
        });
        self.state = DashboardState::Ready;
        LoadOutcome::Applied { alerts }
    }

    pub async fn load(&mut self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = self.fetch().await;
        self.finish_load(ticket, result)
    }

    /// Re-runs the load after a failure.
    pub async fn retry(&mut self) -> LoadOutcome {
        info!("retrying dashboard load ({})", self.state);
        self.load().await
    }

    /// Switches the displayed month and reloads.
    pub async fn set_period(&mut self, period: Period) -> LoadOutcome {
        self.settings.period = period;
        self.load().await
    }

    /// Records a new transaction and refreshes the dashboard. Validation and
    /// not-found errors are shown through the sink and returned.
    pub async fn record_transaction(&mut self, draft: TransactionDraft) -> Result<Transaction> {
        let kind = draft.kind;
        let recorded =
            TransactionService::record(self.transactions.as_ref(), self.categories.as_ref(), draft)
                .await;
        match recorded {
            Ok(transaction) => {
                let text = match kind {
                    TransactionKind::Expense => "Expense added successfully!",
                    TransactionKind::Income => "Income added successfully!",
                };
                self.sink.show_success(text);
                self.load().await;
                Ok(transaction)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    pub async fn delete_transaction(&mut self, id: Uuid) -> Result<Transaction> {
        match TransactionService::remove(self.transactions.as_ref(), id).await {
            Ok(removed) => {
                self.sink.show_success("Transaction deleted");
                self.load().await;
                Ok(removed)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    pub async fn add_category(&mut self, category: Category) -> Result<Category> {
        match CategoryService::add(self.categories.as_ref(), category).await {
            Ok(created) => {
                self.sink
                    .show_success(&format!("Category `{}` created", created.name));
                self.load().await;
                Ok(created)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    /// Deletes a category. Its transactions stay and count as unknown.
    pub async fn delete_category(&mut self, id: Uuid) -> Result<CategoryRemoval> {
        let removal =
            CategoryService::remove(self.categories.as_ref(), self.transactions.as_ref(), id).await;
        match removal {
            Ok(removal) => {
                self.sink
                    .show_success(&format!("Category `{}` deleted", removal.category.name));
                self.load().await;
                Ok(removal)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    /// Sets the overall budget for the displayed month and reloads.
    pub async fn set_monthly_budget(&mut self, total_budget: f64) -> Result<MonthlyBudget> {
        let period = self.settings.period;
        match BudgetService::set_for_period(self.budgets.as_ref(), period, total_budget).await {
            Ok(budget) => {
                self.sink
                    .show_success(&format!("Budget for {} updated", period.label()));
                self.load().await;
                Ok(budget)
            }
            Err(err) => Err(self.surface(err)),
        }
    }

    /// Drops dedup entries older than the configured max age.
    pub fn cleanup_alerts(&mut self, now: DateTime<Utc>) -> usize {
        let removed = self.alerts.cleanup(self.settings.alert_max_age, now);
        if removed > 0 {
            info!("cleaned up {removed} expired alert latch(es)");
        }
        removed
    }

    pub fn reset_alerts(&mut self) {
        self.alerts.clear();
    }

    fn surface(&self, err: BudgetError) -> BudgetError {
        warn!("dashboard action failed: {err}");
        self.sink.show_error(&err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Latency;
    use crate::core::services::AlertKind;
    use crate::notify::{MemorySink, NotificationLevel};
    use crate::storage::{InMemoryBudgetStore, InMemoryCategoryStore, InMemoryTransactionStore};

    type MemoryDashboard =
        Dashboard<InMemoryCategoryStore, InMemoryTransactionStore, InMemoryBudgetStore>;

    fn march() -> Period {
        Period::new(2024, 3).unwrap()
    }

    fn dashboard(sink: Arc<MemorySink>) -> MemoryDashboard {
        let categories = Arc::new(InMemoryCategoryStore::seeded(Latency::none()).unwrap());
        let transactions = Arc::new(InMemoryTransactionStore::seeded(Latency::none()).unwrap());
        let budgets = Arc::new(InMemoryBudgetStore::seeded(Latency::none()).unwrap());
        let settings = DashboardSettings::from_config(&Config::default(), march()).unwrap();
        Dashboard::new(categories, transactions, budgets, sink, settings)
    }

    #[tokio::test]
    async fn first_load_fires_alerts_for_categories_already_past_thresholds() {
        let sink = Arc::new(MemorySink::new());
        let mut dash = dashboard(sink.clone());
        let outcome = dash.load().await;

        let mut fired: Vec<_> = outcome
            .alerts()
            .iter()
            .map(|alert| (alert.category_name.clone(), alert.kind))
            .collect();
        fired.sort();
        assert_eq!(
            fired,
            vec![
                ("Dining Out".to_string(), AlertKind::Over),
                ("Groceries".to_string(), AlertKind::Warning),
            ]
        );
        assert_eq!(dash.state(), &DashboardState::Ready);

        let levels: Vec<_> = sink.drain().into_iter().map(|n| n.level).collect();
        assert!(levels.contains(&NotificationLevel::Warning));
        assert!(levels.contains(&NotificationLevel::Error));

        let again = dash.load().await;
        assert!(again.is_applied());
        assert!(again.alerts().is_empty());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn stale_ticket_is_discarded() {
        let sink = Arc::new(MemorySink::new());
        let mut dash = dashboard(sink);
        let first = dash.begin_load();
        let second = dash.begin_load();
        assert!(second > first);

        let stale = dash.fetch().await;
        assert!(matches!(dash.finish_load(first, stale), LoadOutcome::Stale));
        assert!(dash.snapshot().is_none());
        assert_eq!(dash.state(), &DashboardState::Loading);

        let fresh = dash.fetch().await;
        assert!(dash.finish_load(second, fresh).is_applied());
        assert!(dash.snapshot().is_some());
    }

    #[tokio::test]
    async fn cleanup_uses_configured_max_age() {
        let sink = Arc::new(MemorySink::new());
        let mut dash = dashboard(sink);
        dash.load().await;
        assert_eq!(dash.alert_store().len(), 2);

        assert_eq!(dash.cleanup_alerts(Utc::now()), 0);
        let later = Utc::now() + chrono::Duration::hours(25);
        assert_eq!(dash.cleanup_alerts(later), 2);
        assert!(dash.alert_store().is_empty());
    }

    #[test]
    fn failed_state_offers_retry() {
        let failed = DashboardState::Failed {
            message: "Failed to load your budget dashboard".into(),
        };
        assert!(failed.can_retry());
        assert!(!DashboardState::Ready.can_retry());
        assert_eq!(failed.to_string(), "failed: Failed to load your budget dashboard");
    }

    #[test]
    fn settings_reject_out_of_range_config() {
        let config = Config {
            alert_max_age_hours: i64::MAX,
            ..Config::default()
        };
        let err = DashboardSettings::from_config(&config, march()).unwrap_err();
        assert!(matches!(err, BudgetError::Config(_)));
    }

    #[tokio::test]
    async fn monthly_budget_drives_the_overview() {
        let sink = Arc::new(MemorySink::new());
        let mut dash = dashboard(sink.clone());
        dash.load().await;
        let snapshot = dash.snapshot().unwrap();
        assert_eq!(snapshot.budget.total_budget, 3200.0);
        assert_eq!(snapshot.overview.total_budget, 3200.0);
        sink.drain();

        dash.set_monthly_budget(1000.0).await.unwrap();
        let overview = &dash.snapshot().unwrap().overview;
        assert_eq!(overview.total_budget, 1000.0);
        assert!(overview.is_over_budget());
        assert_eq!(sink.drain()[0].text, "Budget for Mar 2024 updated");

        let err = dash.set_monthly_budget(-5.0).await.unwrap_err();
        assert!(matches!(err, BudgetError::Validation(_)));
        assert_eq!(dash.snapshot().unwrap().overview.total_budget, 1000.0);
    }
}
