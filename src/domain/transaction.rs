use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable};
use crate::domain::period::Period;
use crate::errors::BudgetError;

/// A single money movement. Negative amounts are expenses, positive amounts
/// are income or refunds; the sign is the only expense marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn kind(&self) -> TransactionKind {
        if self.is_expense() {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    pub fn period(&self) -> Period {
        Period::of(&self.date)
    }

    /// Case-insensitive match against merchant and note.
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.merchant.to_lowercase().contains(&needle)
            || self
                .note
                .as_deref()
                .map(|note| note.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!("{} {:.2} [{}]", self.merchant, self.amount, self.kind())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    fn sign(self) -> f64 {
        match self {
            TransactionKind::Expense => -1.0,
            TransactionKind::Income => 1.0,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        };
        f.write_str(label)
    }
}

/// User input for a new transaction. `amount` is a positive magnitude; the
/// sign comes from `kind` when the draft is turned into a [`Transaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub merchant: String,
    pub note: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn expense(amount: f64, category_id: Uuid, merchant: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount,
            category_id: Some(category_id),
            merchant: merchant.into(),
            note: None,
            date: None,
        }
    }

    pub fn income(amount: f64, merchant: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Income,
            amount,
            category_id: None,
            merchant: merchant.into(),
            note: None,
            date: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(BudgetError::validation("Please enter a valid amount"));
        }
        if self.kind == TransactionKind::Expense && self.category_id.is_none() {
            return Err(BudgetError::validation("Please select a category"));
        }
        if self.merchant.trim().is_empty() {
            return Err(BudgetError::validation("Please enter a merchant name"));
        }
        Ok(())
    }

    /// Validates the draft and normalizes it to a signed transaction.
    pub fn into_transaction(self) -> Result<Transaction, BudgetError> {
        self.validate()?;
        Ok(Transaction {
            id: Uuid::new_v4(),
            amount: self.kind.sign() * self.amount.abs(),
            category_id: self.category_id,
            merchant: self.merchant.trim().to_string(),
            note: normalize_note(self.note),
            date: self.date.unwrap_or_else(Utc::now),
        })
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Partial update for a transaction. Nested options distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub note: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Maps a present field to `Some`, so an explicit `null` becomes
/// `Some(None)`. Absent fields fall back to `None` through `default`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TransactionPatch {
    pub fn has_effect(&self) -> bool {
        self.amount.is_some()
            || self.category_id.is_some()
            || self.merchant.is_some()
            || self.note.is_some()
            || self.date.is_some()
    }

    /// Returns the patched copy; `amount` is signed like the stored value.
    pub fn apply(&self, transaction: &Transaction) -> Result<Transaction, BudgetError> {
        let mut updated = transaction.clone();
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount == 0.0 {
                return Err(BudgetError::validation("Please enter a valid amount"));
            }
            updated.amount = amount;
        }
        if let Some(category_id) = self.category_id {
            updated.category_id = category_id;
        }
        if let Some(merchant) = &self.merchant {
            let merchant = merchant.trim();
            if merchant.is_empty() {
                return Err(BudgetError::validation("Please enter a merchant name"));
            }
            updated.merchant = merchant.to_string();
        }
        if let Some(note) = &self.note {
            updated.note = normalize_note(note.clone());
        }
        if let Some(date) = self.date {
            updated.date = date;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expense_draft_normalizes_to_negative_amount() {
        let category = Uuid::new_v4();
        let txn = TransactionDraft::expense(42.5, category, "  Corner Market ")
            .with_note("   ")
            .into_transaction()
            .unwrap();
        assert_eq!(txn.amount, -42.5);
        assert_eq!(txn.merchant, "Corner Market");
        assert_eq!(txn.note, None);
        assert_eq!(txn.kind(), TransactionKind::Expense);
        assert_eq!(txn.category_id, Some(category));
    }

    #[test]
    fn income_draft_stays_positive() {
        let txn = TransactionDraft::income(2500.0, "Payroll")
            .into_transaction()
            .unwrap();
        assert_eq!(txn.amount, 2500.0);
        assert!(!txn.is_expense());
    }

    #[test]
    fn draft_validation_messages() {
        let category = Uuid::new_v4();
        let zero = TransactionDraft::expense(0.0, category, "Shop").validate();
        assert!(matches!(zero, Err(BudgetError::Validation(ref m)) if m.contains("amount")));

        let mut no_category = TransactionDraft::expense(5.0, category, "Shop");
        no_category.category_id = None;
        assert!(matches!(
            no_category.validate(),
            Err(BudgetError::Validation(ref m)) if m.contains("category")
        ));

        let blank = TransactionDraft::expense(5.0, category, " ").validate();
        assert!(matches!(blank, Err(BudgetError::Validation(ref m)) if m.contains("merchant")));
    }

    #[test]
    fn search_covers_merchant_and_note() {
        let txn = TransactionDraft::expense(12.0, Uuid::new_v4(), "Blue Bottle")
            .with_note("Oat latte")
            .on(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap())
            .into_transaction()
            .unwrap();
        assert!(txn.matches_text("bottle"));
        assert!(txn.matches_text("LATTE"));
        assert!(!txn.matches_text("grocer"));
        assert_eq!(txn.period(), Period::new(2024, 3).unwrap());
    }

    #[test]
    fn patch_clears_note_and_rejects_zero_amount() {
        let txn = TransactionDraft::expense(12.0, Uuid::new_v4(), "Cafe")
            .with_note("team")
            .into_transaction()
            .unwrap();
        let patch = TransactionPatch {
            note: Some(None),
            category_id: Some(None),
            ..TransactionPatch::default()
        };
        let updated = patch.apply(&txn).unwrap();
        assert_eq!(updated.note, None);
        assert_eq!(updated.category_id, None);

        let zero = TransactionPatch {
            amount: Some(0.0),
            ..TransactionPatch::default()
        };
        assert!(zero.apply(&txn).is_err());
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let clear: TransactionPatch =
            serde_json::from_str(r#"{"category_id": null, "note": null}"#).unwrap();
        assert_eq!(clear.category_id, Some(None));
        assert_eq!(clear.note, Some(None));
        assert!(clear.has_effect());

        let untouched: TransactionPatch = serde_json::from_str(r#"{"amount": -5.0}"#).unwrap();
        assert_eq!(untouched.category_id, None);
        assert_eq!(untouched.note, None);

        let id = Uuid::new_v4();
        let set: TransactionPatch =
            serde_json::from_str(&format!(r#"{{"category_id": "{id}"}}"#)).unwrap();
        assert_eq!(set.category_id, Some(Some(id)));
    }
}
