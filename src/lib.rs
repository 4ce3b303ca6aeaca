// Bank Registry - Core Library
// Exposes all modules for use in the API server and tests

pub mod config;
pub mod crud;
pub mod db;
pub mod entities;
pub mod response;
pub mod schema;

#[cfg(feature = "server")]
pub mod http;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, Environment};
pub use crud::{
    AuthError, Authenticator, Credential, CrudController, CrudError, Permission,
    SecurityConfig, StaticAuthenticator, ValidatedRequest,
};
pub use db::{BankStore, MemoryBankStore, SqliteBankStore};
pub use entities::{format_bank_code, Bank, BankError, BankRegistry};
pub use response::{error_response, success_response, ErrorResponse, SuccessResponse};
pub use schema::{
    CreateBankParams, CreateBankSchema, RequestParams, RequestSchema, ValidationError,
    ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
