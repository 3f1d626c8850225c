use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    core::services::alert_service::DEFAULT_ALERT_MAX_AGE_HOURS, errors::BudgetError,
    utils::paths,
};

const CONFIG_FILE: &str = "config.json";
/// One year of dedup history.
pub const MAX_ALERT_AGE_HOURS: i64 = 24 * 365;
/// Ten years of trend.
pub const MAX_TREND_MONTHS: usize = 120;
const TMP_SUFFIX: &str = "tmp";

/// Simulated round-trip delays for the in-memory stores, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Latency {
    pub list_ms: u64,
    pub get_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list_ms: 300,
            get_ms: 200,
            create_ms: 400,
            update_ms: 350,
            delete_ms: 300,
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            list_ms: 0,
            get_ms: 0,
            create_ms: 0,
            update_ms: 0,
            delete_ms: 0,
        }
    }

    pub fn delay(&self, op: StoreOp) -> Duration {
        let ms = match op {
            StoreOp::List => self.list_ms,
            StoreOp::Get => self.get_ms,
            StoreOp::Create => self.create_ms,
            StoreOp::Update => self.update_ms,
            StoreOp::Delete => self.delete_ms,
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub latency: Latency,
    pub alert_max_age_hours: i64,
    pub recent_limit: usize,
    pub trend_months: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latency: Latency::default(),
            alert_max_age_hours: DEFAULT_ALERT_MAX_AGE_HOURS,
            recent_limit: 7,
            trend_months: 6,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), BudgetError> {
        if !(1..=MAX_ALERT_AGE_HOURS).contains(&self.alert_max_age_hours) {
            return Err(BudgetError::Config(format!(
                "alert_max_age_hours must be between 1 and {MAX_ALERT_AGE_HOURS}, got {}",
                self.alert_max_age_hours
            )));
        }
        if self.trend_months > MAX_TREND_MONTHS {
            return Err(BudgetError::Config(format!(
                "trend_months must be at most {MAX_TREND_MONTHS}, got {}",
                self.trend_months
            )));
        }
        Ok(())
    }

    pub fn alert_max_age(&self) -> Result<chrono::Duration, BudgetError> {
        self.validate()?;
        chrono::Duration::try_hours(self.alert_max_age_hours).ok_or_else(|| {
            BudgetError::Config(format!(
                "alert_max_age_hours out of range: {}",
                self.alert_max_age_hours
            ))
        })
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, BudgetError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, BudgetError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, BudgetError> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), BudgetError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), BudgetError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    // contents must be on disk before the rename publishes them
    file.sync_all()?;
    Ok(())
}
