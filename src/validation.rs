//! Per-field request validation driven by static rule tables.

use std::fmt;

use serde::Serialize;

use crate::fields::{Fields, Value};

/// Constraints for one field. Unset bounds are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rule {
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub exact_len: Option<usize>,
    pub min_val: Option<i64>,
    pub max_val: Option<i64>,
    /// Characters that may not appear in a text value.
    pub charset_deny: &'static str,
    /// Reject any whitespace character in a text value.
    pub deny_whitespace: bool,
}

impl Rule {
    pub const fn new() -> Self {
        Self {
            required: false,
            min_len: None,
            max_len: None,
            exact_len: None,
            min_val: None,
            max_val: None,
            charset_deny: "",
            deny_whitespace: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub const fn exact_len(mut self, len: usize) -> Self {
        self.exact_len = Some(len);
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.min_val = Some(min);
        self.max_val = Some(max);
        self
    }

    pub const fn min_val(mut self, min: i64) -> Self {
        self.min_val = Some(min);
        self
    }

    pub const fn deny(mut self, chars: &'static str) -> Self {
        self.charset_deny = chars;
        self
    }

    pub const fn deny_whitespace(mut self) -> Self {
        self.deny_whitespace = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
}

impl FieldRule {
    pub const fn new(field: &'static str, rule: Rule) -> Self {
        Self { field, rule }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLen,
    MaxLen,
    ExactLen,
    MinVal,
    MaxVal,
    CharsetDeny,
    /// Cross-field ordering, e.g. a booking ending before it starts.
    Order,
    /// The value points at a row that does not exist.
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub rule: RuleKind,
    pub reason: String,
}

impl Violation {
    pub fn new(field: &'static str, rule: RuleKind, reason: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            reason: reason.into(),
        }
    }
}

/// Every violation found for a record, in rule-table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
    pub fn single(field: &'static str, rule: RuleKind, reason: impl Into<String>) -> Self {
        Self(vec![Violation::new(field, rule, reason)])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn has(&self, field: &str, rule: RuleKind) -> bool {
        self.0.iter().any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed: ")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", v.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a full record: required fields must be present.
pub fn validate<R: Fields + ?Sized>(record: &R, rules: &[FieldRule]) -> Result<(), ValidationErrors> {
    check(record, rules, true)
}

/// Validate only the fields the caller supplied (patches).
pub fn validate_partial<R: Fields + ?Sized>(
    record: &R,
    rules: &[FieldRule],
) -> Result<(), ValidationErrors> {
    check(record, rules, false)
}

/// Unwrap a field that `validate` has already proven present.
pub fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| {
        ValidationErrors::single(field, RuleKind::Required, format!("{field} is required"))
    })
}

fn check<R: Fields + ?Sized>(
    record: &R,
    rules: &[FieldRule],
    enforce_required: bool,
) -> Result<(), ValidationErrors> {
    let mut out = Vec::new();
    for &FieldRule { field, rule } in rules {
        match record.field(field) {
            None => {
                if enforce_required && rule.required {
                    out.push(Violation::new(
                        field,
                        RuleKind::Required,
                        format!("{field} is required"),
                    ));
                }
            }
            Some(Value::Text(s)) => check_text(field, s, &rule, &mut out),
            Some(Value::Int(n)) => check_int(field, n, &rule, &mut out),
            Some(Value::Time(_)) => {}
        }
    }
    if out.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(out))
    }
}

fn check_text(field: &'static str, s: &str, rule: &Rule, out: &mut Vec<Violation>) {
    let len = s.chars().count();
    if let Some(exact) = rule.exact_len {
        if len != exact {
            out.push(Violation::new(
                field,
                RuleKind::ExactLen,
                format!("{field} must be exactly {exact} characters"),
            ));
        }
    }
    if let Some(min) = rule.min_len {
        if len < min {
            out.push(Violation::new(
                field,
                RuleKind::MinLen,
                format!("{field} must be at least {min} characters"),
            ));
        }
    }
    if let Some(max) = rule.max_len {
        if len > max {
            out.push(Violation::new(
                field,
                RuleKind::MaxLen,
                format!("{field} must be at most {max} characters"),
            ));
        }
    }
    let denied = s
        .chars()
        .find(|c| rule.charset_deny.contains(*c) || (rule.deny_whitespace && c.is_whitespace()));
    if let Some(c) = denied {
        out.push(Violation::new(
            field,
            RuleKind::CharsetDeny,
            format!("{field} must not contain {c:?}"),
        ));
    }
}

fn check_int(field: &'static str, n: i64, rule: &Rule, out: &mut Vec<Violation>) {
    if let Some(min) = rule.min_val {
        if n < min {
            out.push(Violation::new(
                field,
                RuleKind::MinVal,
                format!("{field} must be at least {min}"),
            ));
        }
    }
    if let Some(max) = rule.max_val {
        if n > max {
            out.push(Violation::new(
                field,
                RuleKind::MaxVal,
                format!("{field} must be at most {max}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Record(HashMap<&'static str, Value<'static>>);

    impl Fields for Record {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            self.0.get(name).copied()
        }
    }

    fn record(fields: &[(&'static str, Value<'static>)]) -> Record {
        Record(fields.iter().copied().collect())
    }

    const RULES: &[FieldRule] = &[
        FieldRule::new("name", Rule::new().required().length(6, 20).deny("/?#").deny_whitespace()),
        FieldRule::new("code", Rule::new().exact_len(4)),
        FieldRule::new("count", Rule::new().required().range(1, 10)),
    ];

    #[test]
    fn accepts_valid_record() {
        let r = record(&[("name", Value::Text("alice1234")), ("count", Value::Int(3))]);
        assert!(validate(&r, RULES).is_ok());
    }

    #[test]
    fn missing_required_field_is_reported_alongside_others() {
        let r = record(&[("name", Value::Text("a/b")), ("code", Value::Text("12345"))]);
        let err = validate(&r, RULES).unwrap_err();
        assert!(err.has("count", RuleKind::Required));
        assert!(err.has("name", RuleKind::MinLen));
        assert!(err.has("name", RuleKind::CharsetDeny));
        assert!(err.has("code", RuleKind::ExactLen));
        assert_eq!(err.violations().len(), 4);
    }

    #[test]
    fn missing_required_field_reported_even_when_rest_is_valid() {
        let r = record(&[("name", Value::Text("alice1234"))]);
        let err = validate(&r, RULES).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "count");
        assert_eq!(err.violations()[0].rule, RuleKind::Required);
    }

    #[test]
    fn violations_follow_rule_table_order() {
        let r = record(&[("count", Value::Int(11)), ("name", Value::Text("x"))]);
        let err = validate(&r, RULES).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "count"]);
        assert!(err.has("count", RuleKind::MaxVal));
    }

    #[test]
    fn partial_skips_required_for_absent_fields() {
        let r = record(&[("code", Value::Text("abcd"))]);
        assert!(validate_partial(&r, RULES).is_ok());

        let r = record(&[("count", Value::Int(0))]);
        let err = validate_partial(&r, RULES).unwrap_err();
        assert!(err.has("count", RuleKind::MinVal));
    }

    #[test]
    fn empty_string_is_present_not_absent() {
        let r = record(&[("name", Value::Text("")), ("count", Value::Int(1))]);
        let err = validate(&r, RULES).unwrap_err();
        assert!(err.has("name", RuleKind::MinLen));
        assert!(!err.has("name", RuleKind::Required));
    }

    #[test]
    fn whitespace_is_denied_when_configured() {
        let r = record(&[("name", Value::Text("alice 1234")), ("count", Value::Int(1))]);
        let err = validate(&r, RULES).unwrap_err();
        assert!(err.has("name", RuleKind::CharsetDeny));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let r = record(&[("name", Value::Text("ßßßßßß")), ("count", Value::Int(1))]);
        assert!(validate(&r, RULES).is_ok());
    }

    #[test]
    fn display_lists_every_reason() {
        let err = ValidationErrors(vec![
            Violation::new("a", RuleKind::Required, "a is required"),
            Violation::new("b", RuleKind::MaxLen, "b must be at most 3 characters"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: a is required; b must be at most 3 characters"
        );
    }
}
