// 📐 Shape Layer - Request Schema Validation
// Validates raw request parameters before anything touches the store

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Raw parameter bag handed to a schema (path + query + body, merged)
pub type Params = Map<String, Value>;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

// ============================================================================
// REQUEST PARAMETERS
// ============================================================================

/// Everything a request carries that a schema may look at
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub path: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Params,
}

impl RequestParams {
    pub fn from_body(body: Params) -> Self {
        RequestParams {
            body,
            ..Default::default()
        }
    }

    /// Merge path, query and body. Later sources win: body > query > path.
    pub fn merged(&self) -> Params {
        let mut params = Params::new();

        for (key, value) in self.path.iter().chain(self.query.iter()) {
            params.insert(key.clone(), Value::String(value.clone()));
        }

        for (key, value) in &self.body {
            params.insert(key.clone(), value.clone());
        }

        params
    }
}

// ============================================================================
// SCHEMA TRAIT
// ============================================================================

/// A declarative check over a parameter bag
///
/// Implementations must be pure: no side effects, and every violated
/// constraint is reported rather than stopping at the first one.
pub trait RequestSchema {
    type Output;

    fn validate(&self, params: &Params) -> ValidationResult<Self::Output>;
}

// ============================================================================
// STRING FIELD RULES
// ============================================================================

#[derive(Debug, Clone)]
pub enum StringRule {
    MinLength(usize, &'static str),
    MaxLength(usize, &'static str),
    Pattern(&'static LazyLock<Regex>, &'static str),
}

impl StringRule {
    fn check(&self, value: &str) -> Option<&'static str> {
        match self {
            StringRule::MinLength(min, message) => {
                (value.chars().count() < *min).then_some(*message)
            }
            StringRule::MaxLength(max, message) => {
                (value.chars().count() > *max).then_some(*message)
            }
            StringRule::Pattern(pattern, message) => {
                (!pattern.is_match(value)).then_some(*message)
            }
        }
    }
}

/// A required string field with an ordered list of rules
#[derive(Debug, Clone)]
pub struct StringField {
    pub name: &'static str,
    /// Trim surrounding whitespace before the rules run
    pub trim: bool,
    /// Accept non-negative JSON integers and use their decimal form
    pub coerce_integers: bool,
    pub rules: Vec<StringRule>,
}

impl StringField {
    pub fn new(name: &'static str) -> Self {
        StringField {
            name,
            trim: false,
            coerce_integers: false,
            rules: Vec::new(),
        }
    }

    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn coerce_integers(mut self) -> Self {
        self.coerce_integers = true;
        self
    }

    pub fn rule(mut self, rule: StringRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Pull the field out of `params`, pushing one error per failed rule
    pub fn extract(&self, params: &Params, errors: &mut Vec<ValidationError>) -> Option<String> {
        let raw = match params.get(self.name) {
            None | Some(Value::Null) => {
                errors.push(ValidationError::new(self.name, "Required"));
                return None;
            }
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) if self.coerce_integers && n.is_u64() => n.to_string(),
            Some(other) => {
                errors.push(ValidationError::new(
                    self.name,
                    format!("Expected string, received {}", json_type_name(other)),
                ));
                return None;
            }
        };

        let value = if self.trim {
            raw.trim().to_string()
        } else {
            raw
        };

        let before = errors.len();
        for rule in &self.rules {
            if let Some(message) = rule.check(&value) {
                errors.push(ValidationError::new(self.name, message));
            }
        }

        (errors.len() == before).then_some(value)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// CREATE BANK SCHEMA
// ============================================================================

static BANK_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}$").expect("bank code pattern is valid"));

pub const BANK_NAME_MAX_LENGTH: usize = 100;

/// Validated payload for creating a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBankParams {
    /// 1-3 ASCII digits, not yet zero-padded
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreateBankSchema {
    code: StringField,
    name: StringField,
}

impl CreateBankSchema {
    pub fn new() -> Self {
        CreateBankSchema {
            code: StringField::new("code")
                .trimmed()
                .coerce_integers()
                .rule(StringRule::MinLength(1, "Bank code is required"))
                .rule(StringRule::MaxLength(3, "Bank code must be at most 3 digits"))
                .rule(StringRule::Pattern(
                    &BANK_CODE_PATTERN,
                    "Bank code must contain only digits",
                )),
            name: StringField::new("name")
                .rule(StringRule::MinLength(1, "Bank name is required"))
                .rule(StringRule::MaxLength(
                    BANK_NAME_MAX_LENGTH,
                    "Bank name must be at most 100 characters",
                )),
        }
    }
}

impl Default for CreateBankSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSchema for CreateBankSchema {
    type Output = CreateBankParams;

    fn validate(&self, params: &Params) -> ValidationResult<CreateBankParams> {
        let mut errors = Vec::new();

        let code = self.code.extract(params, &mut errors);
        let name = self.name.extract(params, &mut errors);

        match (code, name) {
            (Some(code), Some(name)) if errors.is_empty() => Ok(CreateBankParams { code, name }),
            _ => Err(errors),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("test params must be an object"),
        }
    }

    fn messages(errors: &[ValidationError], field: &str) -> Vec<String> {
        errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_valid_payload() {
        let schema = CreateBankSchema::new();
        let result = schema
            .validate(&params(json!({"code": "001", "name": "Banco do Brasil"})))
            .unwrap();

        assert_eq!(result.code, "001");
        assert_eq!(result.name, "Banco do Brasil");
    }

    #[test]
    fn test_code_is_trimmed() {
        let schema = CreateBankSchema::new();
        let result = schema
            .validate(&params(json!({"code": " 33 ", "name": "Santander"})))
            .unwrap();

        assert_eq!(result.code, "33");
    }

    #[test]
    fn test_integer_code_is_coerced() {
        let schema = CreateBankSchema::new();
        let result = schema
            .validate(&params(json!({"code": 104, "name": "Caixa"})))
            .unwrap();

        assert_eq!(result.code, "104");
    }

    #[test]
    fn test_negative_code_rejected() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": -1, "name": "Caixa"})))
            .unwrap_err();

        assert_eq!(messages(&errors, "code"), vec!["Expected string, received number"]);
    }

    #[test]
    fn test_empty_code_rejected() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "", "name": "Banco Teste"})))
            .unwrap_err();

        let code_errors = messages(&errors, "code");
        assert!(code_errors.contains(&"Bank code is required".to_string()));
        assert!(code_errors.contains(&"Bank code must contain only digits".to_string()));
        assert!(messages(&errors, "name").is_empty());
    }

    #[test]
    fn test_non_numeric_code_rejected() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "ABC", "name": "Banco Teste"})))
            .unwrap_err();

        assert_eq!(messages(&errors, "code"), vec!["Bank code must contain only digits"]);
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "١٢", "name": "Banco Teste"})))
            .unwrap_err();

        assert_eq!(messages(&errors, "code"), vec!["Bank code must contain only digits"]);
    }

    #[test]
    fn test_long_code_rejected() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "1234", "name": "Banco Teste"})))
            .unwrap_err();

        let code_errors = messages(&errors, "code");
        assert!(code_errors.contains(&"Bank code must be at most 3 digits".to_string()));
        assert!(code_errors.contains(&"Bank code must contain only digits".to_string()));
    }

    #[test]
    fn test_every_violation_reported() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "", "name": ""})))
            .unwrap_err();

        assert!(!messages(&errors, "code").is_empty());
        assert_eq!(messages(&errors, "name"), vec!["Bank name is required"]);
    }

    #[test]
    fn test_missing_fields_required() {
        let schema = CreateBankSchema::new();
        let errors = schema.validate(&Params::new()).unwrap_err();

        assert_eq!(messages(&errors, "code"), vec!["Required"]);
        assert_eq!(messages(&errors, "name"), vec!["Required"]);
    }

    #[test]
    fn test_name_length_bounds() {
        let schema = CreateBankSchema::new();

        let max = "x".repeat(BANK_NAME_MAX_LENGTH);
        assert!(schema
            .validate(&params(json!({"code": "1", "name": max})))
            .is_ok());

        let too_long = "x".repeat(BANK_NAME_MAX_LENGTH + 1);
        let errors = schema
            .validate(&params(json!({"code": "1", "name": too_long})))
            .unwrap_err();
        assert_eq!(
            messages(&errors, "name"),
            vec!["Bank name must be at most 100 characters"]
        );
    }

    #[test]
    fn test_name_length_counts_characters() {
        let schema = CreateBankSchema::new();
        // 100 multi-byte characters is still within bounds
        let name = "ú".repeat(BANK_NAME_MAX_LENGTH);

        assert!(schema
            .validate(&params(json!({"code": "341", "name": name})))
            .is_ok());
    }

    #[test]
    fn test_name_must_be_string() {
        let schema = CreateBankSchema::new();
        let errors = schema
            .validate(&params(json!({"code": "1", "name": 42})))
            .unwrap_err();

        assert_eq!(messages(&errors, "name"), vec!["Expected string, received number"]);
    }

    #[test]
    fn test_merged_params_body_wins() {
        let mut request = RequestParams::from_body(params(json!({"code": "237"})));
        request.path.insert("code".to_string(), "1".to_string());
        request.query.insert("code".to_string(), "2".to_string());
        request.query.insert("name".to_string(), "Bradesco".to_string());

        let merged = request.merged();
        assert_eq!(merged["code"], json!("237"));
        assert_eq!(merged["name"], json!("Bradesco"));
    }

    #[test]
    fn test_merged_params_query_beats_path() {
        let mut request = RequestParams::default();
        request.path.insert("code".to_string(), "1".to_string());
        request.query.insert("code".to_string(), "2".to_string());

        assert_eq!(request.merged()["code"], json!("2"));
    }
}
