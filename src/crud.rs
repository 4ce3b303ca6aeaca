// CRUD Controller - validation + identity for every entry point
//
// Entity handlers never look at raw parameters or resolve callers
// themselves. They hand the request and a schema to a CrudController and get
// back either a ValidatedRequest or a CrudError.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::schema::{RequestParams, RequestSchema, ValidationError};

// ============================================================================
// SECURITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Create => "CREATE",
            Permission::Read => "READ",
            Permission::Update => "UPDATE",
            Permission::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permission required on a securable resource ("BANK", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    pub securable: &'static str,
    pub permission: Permission,
}

impl SecurityConfig {
    pub fn new(securable: &'static str, permission: Permission) -> Self {
        SecurityConfig {
            securable,
            permission,
        }
    }
}

/// Resolved caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub account_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    #[error("missing {permission} permission on {securable}")]
    Forbidden {
        securable: &'static str,
        permission: Permission,
    },
}

/// Resolves who is calling and whether they may do what they ask
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        request: &RequestParams,
        security: &[SecurityConfig],
    ) -> Result<Credential, AuthError>;
}

/// Grants every request one fixed identity
///
/// Stands in until a real identity provider is wired up.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthenticator {
    credential: Credential,
}

impl StaticAuthenticator {
    pub fn new(account_id: i64, user_id: i64) -> Self {
        StaticAuthenticator {
            credential: Credential {
                account_id,
                user_id,
            },
        }
    }
}

impl Default for StaticAuthenticator {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(
        &self,
        _request: &RequestParams,
        _security: &[SecurityConfig],
    ) -> Result<Credential, AuthError> {
        Ok(self.credential)
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest<T> {
    pub credential: Credential,
    pub params: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrudError {
    #[error("request validation failed ({} error(s))", .0.len())]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub struct CrudController {
    security: Vec<SecurityConfig>,
    authenticator: Arc<dyn Authenticator>,
}

impl CrudController {
    pub fn new(security: Vec<SecurityConfig>, authenticator: Arc<dyn Authenticator>) -> Self {
        CrudController {
            security,
            authenticator,
        }
    }

    pub fn create<S: RequestSchema>(
        &self,
        request: &RequestParams,
        schema: &S,
    ) -> Result<ValidatedRequest<S::Output>, CrudError> {
        self.validate(request, schema)
    }

    pub fn read<S: RequestSchema>(
        &self,
        request: &RequestParams,
        schema: &S,
    ) -> Result<ValidatedRequest<S::Output>, CrudError> {
        self.validate(request, schema)
    }

    pub fn update<S: RequestSchema>(
        &self,
        request: &RequestParams,
        schema: &S,
    ) -> Result<ValidatedRequest<S::Output>, CrudError> {
        self.validate(request, schema)
    }

    pub fn delete<S: RequestSchema>(
        &self,
        request: &RequestParams,
        schema: &S,
    ) -> Result<ValidatedRequest<S::Output>, CrudError> {
        self.validate(request, schema)
    }

    fn validate<S: RequestSchema>(
        &self,
        request: &RequestParams,
        schema: &S,
    ) -> Result<ValidatedRequest<S::Output>, CrudError> {
        let credential = self.authenticator.authenticate(request, &self.security)?;
        let params = schema
            .validate(&request.merged())
            .map_err(CrudError::Validation)?;

        Ok(ValidatedRequest { credential, params })
    }
}

// ============================================================================
// TESTS
// ============================================================================
