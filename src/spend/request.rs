//! Spend request shape checks
//!
//! The body is taken as loose JSON so that a wrong type becomes a field error
//! instead of a whole-body rejection. Only after every field has the right
//! shape is it turned into a [`ValidSpend`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::core_types::Credit;

/// Per-field error messages, keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const REQUIRED: &str = "This field is required.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_A_STRING: &str = "Not a valid string.";
const BLANK: &str = "This field may not be blank.";

/// Raw `POST /api/v1/sell` body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SpendRequest {
    #[serde(default)]
    #[schema(value_type = i64, example = 50)]
    pub amount: Option<Value>,
    #[serde(default)]
    #[schema(value_type = String, example = "111")]
    pub receiver: Option<Value>,
}

/// Spend input with a well-formed shape. The amount may still be rejected by
/// the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ValidSpend {
    pub amount: Credit,
    #[validate(length(max = 14, message = "Ensure this field has no more than 14 characters."))]
    pub receiver: String,
}

impl SpendRequest {
    pub fn new(amount: Credit, receiver: &str) -> Self {
        Self {
            amount: Some(Value::from(amount)),
            receiver: Some(Value::from(receiver)),
        }
    }

    /// Check every field and collect all problems
    pub fn validate(&self) -> Result<ValidSpend, FieldErrors> {
        let mut errors = FieldErrors::new();

        let amount = match &self.amount {
            None | Some(Value::Null) => {
                push(&mut errors, "amount", REQUIRED);
                None
            }
            // as_i64 is None for floats and for integers outside i64
            Some(v) => v.as_i64().or_else(|| {
                push(&mut errors, "amount", NOT_AN_INTEGER);
                None
            }),
        };

        let receiver = match &self.receiver {
            None | Some(Value::Null) => {
                push(&mut errors, "receiver", REQUIRED);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                push(&mut errors, "receiver", BLANK);
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                push(&mut errors, "receiver", NOT_A_STRING);
                None
            }
        };

        let (Some(amount), Some(receiver)) = (amount, receiver) else {
            return Err(errors);
        };

        let spend = ValidSpend { amount, receiver };
        if let Err(e) = Validate::validate(&spend) {
            collect_validation_errors(&mut errors, &e);
            return Err(errors);
        }
        Ok(spend)
    }
}

/// Flatten `validator` errors into per-field messages
pub fn collect_validation_errors(errors: &mut FieldErrors, e: &ValidationErrors) {
    for (field, field_errors) in e.field_errors() {
        for err in field_errors {
            let msg = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            push(errors, &field, &msg);
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, msg: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(msg.to_string());
}
