#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use budget_pulse::{
    config::{Config, ConfigManager, Latency},
    dashboard::{Dashboard, DashboardSettings},
    domain::Period,
    notify::MemorySink,
    storage::{InMemoryBudgetStore, InMemoryCategoryStore, InMemoryTransactionStore},
};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const GROCERIES: &str = "c0a80101-0000-4000-8000-000000000001";
pub const DINING_OUT: &str = "c0a80101-0000-4000-8000-000000000002";
pub const TRANSPORTATION: &str = "c0a80101-0000-4000-8000-000000000003";

pub type TestDashboard =
    Dashboard<InMemoryCategoryStore, InMemoryTransactionStore, InMemoryBudgetStore>;

pub struct Harness {
    pub dashboard: TestDashboard,
    pub categories: Arc<InMemoryCategoryStore>,
    pub transactions: Arc<InMemoryTransactionStore>,
    pub budgets: Arc<InMemoryBudgetStore>,
    pub sink: Arc<MemorySink>,
}

pub fn id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).expect("fixture id")
}

pub fn march_2024() -> Period {
    Period::new(2024, 3).expect("valid period")
}

pub fn late_march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0)
        .single()
        .expect("valid date")
}

/// Fixture-seeded dashboard for March 2024 with no simulated latency.
pub fn seeded_harness() -> Harness {
    let categories =
        Arc::new(InMemoryCategoryStore::seeded(Latency::none()).expect("seed categories"));
    let transactions =
        Arc::new(InMemoryTransactionStore::seeded(Latency::none()).expect("seed transactions"));
    let budgets = Arc::new(InMemoryBudgetStore::seeded(Latency::none()).expect("seed budgets"));
    let sink = Arc::new(MemorySink::new());
    let settings = DashboardSettings::from_config(&Config::default(), march_2024())
        .expect("default config is in range");
    let dashboard = Dashboard::new(
        categories.clone(),
        transactions.clone(),
        budgets.clone(),
        sink.clone(),
        settings,
    );
    Harness {
        dashboard,
        categories,
        transactions,
        budgets,
        sink,
    }
}

/// Creates an isolated app data directory that lives for the whole test run.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn config_manager() -> ConfigManager {
    ConfigManager::with_base_dir(temp_home()).expect("create config manager for temp dir")
}
