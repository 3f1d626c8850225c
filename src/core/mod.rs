pub mod format;
pub mod services;

pub use format::{format_currency, format_percentage};
