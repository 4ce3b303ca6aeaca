// 🗄️ Bank Store - persistence seam for bank records
//
// The business rule only needs three things from storage: find a record by
// predicate, hand out the next id, and append. Anything that can do those
// (a Vec, SQLite, a real database) can back the registry.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::entities::Bank;

// ============================================================================
// STORE TRAIT
// ============================================================================

pub trait BankStore: Send {
    /// All records in insertion order, deleted ones included
    fn all(&self) -> Result<Vec<Bank>>;

    /// First record matching `predicate`
    fn find(&self, predicate: &dyn Fn(&Bank) -> bool) -> Result<Option<Bank>> {
        Ok(self.all()?.into_iter().find(|bank| predicate(bank)))
    }

    /// Reserve the next id. Ids are strictly increasing and never reused.
    fn next_id(&mut self) -> Result<i64>;

    fn append(&mut self, bank: Bank) -> Result<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Append-only list plus a monotonic id counter
#[derive(Debug)]
pub struct MemoryBankStore {
    banks: Vec<Bank>,
    next_id: i64,
}

impl MemoryBankStore {
    pub fn new() -> Self {
        MemoryBankStore {
            banks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

impl Default for MemoryBankStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BankStore for MemoryBankStore {
    fn all(&self) -> Result<Vec<Bank>> {
        Ok(self.banks.clone())
    }

    fn find(&self, predicate: &dyn Fn(&Bank) -> bool) -> Result<Option<Bank>> {
        Ok(self.banks.iter().find(|bank| predicate(bank)).cloned())
    }

    fn next_id(&mut self) -> Result<i64> {
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    fn append(&mut self, bank: Bank) -> Result<()> {
        self.banks.push(bank);
        Ok(())
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteBankStore {
    conn: Connection,
}

impl SqliteBankStore {
    /// Open (or create) a database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open bank database at {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn with_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteBankStore { conn })
    }
}

/// Create the bank tables
pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL is a no-op for in-memory databases
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS banks (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            date_created TEXT NOT NULL,
            date_modified TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // Single-row counter so ids survive even if rows ever go away
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bank_sequence (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            next_id INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO bank_sequence (id, next_id)
         VALUES (1, (SELECT COALESCE(MAX(id), 0) + 1 FROM banks))",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_banks_code ON banks(code)",
        [],
    )?;

    Ok(())
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl BankStore for SqliteBankStore {
    fn all(&self) -> Result<Vec<Bank>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_id, code, name, date_created, date_modified, deleted
             FROM banks
             ORDER BY id ASC",
        )?;

        let banks = stmt
            .query_map([], |row| {
                Ok(Bank {
                    id: row.get(0)?,
                    account_id: row.get(1)?,
                    code: row.get(2)?,
                    name: row.get(3)?,
                    date_created: parse_timestamp(4, row.get(4)?)?,
                    date_modified: parse_timestamp(5, row.get(5)?)?,
                    deleted: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read banks")?;

        Ok(banks)
    }

    fn next_id(&mut self) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let id: i64 = tx.query_row("SELECT next_id FROM bank_sequence WHERE id = 1", [], |row| {
            row.get(0)
        })?;
        tx.execute("UPDATE bank_sequence SET next_id = ?1 WHERE id = 1", params![id + 1])?;
        tx.commit()?;
        Ok(id)
    }

    fn append(&mut self, bank: Bank) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO banks (id, account_id, code, name, date_created, date_modified, deleted)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bank.id,
                    bank.account_id,
                    bank.code,
                    bank.name,
                    format_timestamp(&bank.date_created),
                    format_timestamp(&bank.date_modified),
                    bank.deleted,
                ],
            )
            .with_context(|| format!("Failed to insert bank {}", bank.id))?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
