// 🏦 Bank Entity - registered bank codes
//
// A bank is a (code, name) pair owned by an account. The code is stored
// zero-padded to three digits ("1" → "001") and is unique among records
// that are not soft-deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::db::{BankStore, MemoryBankStore};

/// Width every stored bank code is padded to
pub const BANK_CODE_WIDTH: usize = 3;

// ============================================================================
// BANK ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// Assigned by the store, never reused
    pub id: i64,

    /// Owning account context
    pub account_id: i64,

    /// Always exactly three ASCII digits
    pub code: String,

    pub name: String,

    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,

    /// Soft-delete flag. Deleted records do not take part in uniqueness.
    pub deleted: bool,
}

impl Bank {
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Left-pad a bank code with zeros to [`BANK_CODE_WIDTH`]
///
/// Codes that are already wide enough come back unchanged.
pub fn format_bank_code(code: &str) -> String {
    format!("{:0>width$}", code, width = BANK_CODE_WIDTH)
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BankError {
    #[error("bank code {code} already exists")]
    DuplicateCode { code: String },

    #[error("bank store failure")]
    Store(#[from] anyhow::Error),
}

// ============================================================================
// BANK REGISTRY
// ============================================================================

/// Business rules over a [`BankStore`]
///
/// The store sits behind a mutex that is held for the whole
/// check-then-insert sequence, so two concurrent creates with the same code
/// cannot both pass the duplicate check.
pub struct BankRegistry {
    store: Mutex<Box<dyn BankStore>>,
}

impl BankRegistry {
    pub fn new(store: impl BankStore + 'static) -> Self {
        BankRegistry {
            store: Mutex::new(Box::new(store)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBankStore::new())
    }

    fn store(&self) -> MutexGuard<'_, Box<dyn BankStore>> {
        // A panic mid-create leaves the store as it was before the append
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new bank
    ///
    /// `code` must already have passed validation (1-3 ASCII digits). It is
    /// normalized before the duplicate check, so "1" collides with "001".
    pub fn create_bank(
        &self,
        account_id: i64,
        user_id: i64,
        code: &str,
        name: &str,
    ) -> Result<Bank, BankError> {
        let normalized = format_bank_code(code);
        let mut store = self.store();

        let existing = store.find(&|b: &Bank| b.is_active() && b.code == normalized)?;
        if existing.is_some() {
            tracing::warn!(code = %normalized, account_id, user_id, "bank code already exists");
            return Err(BankError::DuplicateCode { code: normalized });
        }

        let now = Utc::now();
        let bank = Bank {
            id: store.next_id()?,
            account_id,
            code: normalized,
            name: name.to_string(),
            date_created: now,
            date_modified: now,
            deleted: false,
        };

        store.append(bank.clone())?;

        tracing::info!(id = bank.id, code = %bank.code, account_id, user_id, "bank created");
        Ok(bank)
    }

    /// All banks that are not soft-deleted, in id order
    pub fn list_banks(&self) -> Result<Vec<Bank>, BankError> {
        let mut banks: Vec<Bank> = self
            .store()
            .all()?
            .into_iter()
            .filter(Bank::is_active)
            .collect();
        banks.sort_by_key(|b| b.id);
        Ok(banks)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Bank>, BankError> {
        Ok(self.store().find(&|b: &Bank| b.id == id && b.is_active())?)
    }

    pub fn find_by_code(&self, code: &str) -> Result<Option<Bank>, BankError> {
        let normalized = format_bank_code(code);
        Ok(self
            .store()
            .find(&|b: &Bank| b.code == normalized && b.is_active())?)
    }

    /// Count active banks
    pub fn count(&self) -> Result<usize, BankError> {
        Ok(self.list_banks()?.len())
    }
}

impl Default for BankRegistry {
    fn default() -> Self {
        Self::in_memory()
    }
}

// ============================================================================
// TESTS
// ============================================================================
