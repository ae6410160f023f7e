//! Printer inventory and routing-rule records (component B).

use serde::{Deserialize, Serialize};

fn default_port() -> u16 {
    9100
}

fn default_true() -> bool {
    true
}

/// One entry in the printer inventory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub id: String,
    pub name: String,
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub location_hint: Option<String>,
}

/// The comparison operator a routing rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleOperator {
    Equals,
    StartsWith,
    Contains,
}

impl RuleOperator {
    /// Parses the operator token case-insensitively; `None` if unrecognized
    /// (callers must fail the rule, not silently skip it).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "EQUALS" => Some(RuleOperator::Equals),
            "STARTS_WITH" => Some(RuleOperator::StartsWith),
            "CONTAINS" => Some(RuleOperator::Contains),
            _ => None,
        }
    }

    /// Applies the operator to already-uppercased `context_value` and `rule_value`.
    pub fn matches(&self, context_value: &str, rule_value: &str) -> bool {
        match self {
            RuleOperator::Equals => context_value == rule_value,
            RuleOperator::StartsWith => context_value.starts_with(rule_value),
            RuleOperator::Contains => context_value.contains(rule_value),
        }
    }
}

/// One printer-selection rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub field: String,
    pub operator: String,
    pub value: String,
    pub target_printer_id: String,
}
