// Entity Models
//
// Each entity has:
// - Numeric identity assigned by its store
// - A registry holding the business rules for creating it

pub mod bank;

pub use bank::{format_bank_code, Bank, BankError, BankRegistry, BANK_CODE_WIDTH};
