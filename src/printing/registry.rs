//! Printer inventory + routing-rule selection (component B).
//!
//! The on-disk routing file nests each rule as `when.all[0]` + `then.printerId`;
//! only the first `when.all` condition is honored, matching the flat
//! single-condition `RoutingRule` entity. That's loaded here and flattened
//! into [`crate::models::RoutingRule`] so the selection engine itself only
//! ever deals with the flat shape.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::{WmsError, WmsResult};
use crate::models::{PrinterConfig, RoutingRule, RuleOperator};

/// Raw shape of the printer inventory YAML (`printers:` list).
#[derive(Debug, Deserialize)]
struct PrinterInventoryFile {
    printers: Vec<PrinterConfig>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    field: String,
    op: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawWhen {
    all: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThen {
    printer_id: String,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default = "default_true")]
    enabled: bool,
    when: RawWhen,
    then: RawThen,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingFile {
    default_printer_id: String,
    #[serde(default)]
    rules: Vec<RawRule>,
}

/// The ordered routing-rule set plus its fallback printer id.
#[derive(Debug, Clone)]
pub struct RoutingRuleSet {
    pub default_printer_id: String,
    pub rules: Vec<RoutingRule>,
}

impl RoutingRuleSet {
    pub fn parse(yaml: &str) -> WmsResult<Self> {
        let raw: RoutingFile = serde_yaml::from_str(yaml)?;
        let rules = raw
            .rules
            .into_iter()
            .filter_map(|r| {
                let cond = r.when.all.into_iter().next()?;
                Some(RoutingRule {
                    id: r.id,
                    enabled: r.enabled,
                    field: cond.field,
                    operator: cond.op,
                    value: cond.value,
                    target_printer_id: r.then.printer_id,
                })
            })
            .collect();
        Ok(Self { default_printer_id: raw.default_printer_id, rules })
    }
}

/// The full printer inventory plus routing rules; resolves a printer id from a
/// string->string context map.
#[derive(Debug, Clone)]
pub struct PrinterRegistry {
    printers: HashMap<String, PrinterConfig>,
    routing: RoutingRuleSet,
}

impl PrinterRegistry {
    pub fn load(inventory_yaml: &str, routing_yaml: &str) -> WmsResult<Self> {
        let inventory: PrinterInventoryFile = serde_yaml::from_str(inventory_yaml)?;
        let routing = RoutingRuleSet::parse(routing_yaml)?;
        let printers = inventory.printers.into_iter().map(|p| (p.id.clone(), p)).collect();
        Ok(Self { printers, routing })
    }

    /// Explicit lookup by id; `None` if unknown or disabled.
    pub fn find_printer(&self, id: &str) -> Option<&PrinterConfig> {
        self.printers.get(id).filter(|p| p.enabled)
    }

    /// Evaluates rules in declaration order and returns the first enabled rule
    /// match, else the default printer. Fails if the resolved printer is
    /// unknown/disabled, or if a considered rule names an unknown operator.
    pub fn select_printer(&self, context: &HashMap<String, String>) -> WmsResult<&PrinterConfig> {
        let mut target_id: Option<&str> = None;
        for rule in &self.routing.rules {
            if !rule.enabled {
                continue;
            }
            let Some(context_value) = context.get(&rule.field) else {
                continue;
            };
            let operator = RuleOperator::parse(&rule.operator).ok_or_else(|| {
                WmsError::config(format!(
                    "routing rule {:?} names unknown operator {:?}",
                    rule.id, rule.operator
                ))
            })?;
            if operator.matches(&context_value.to_uppercase(), &rule.value.to_uppercase()) {
                target_id = Some(&rule.target_printer_id);
                break;
            }
        }
        let resolved_id = target_id.unwrap_or(&self.routing.default_printer_id);
        self.find_printer(resolved_id).ok_or_else(|| {
            WmsError::config(format!("routing resolved to unknown or disabled printer {resolved_id:?}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = "printers:\n\
  - id: DISPATCH\n\
    name: Dispatch Dock\n\
    ip: 10.0.0.5\n\
  - id: OFFICE\n\
    name: Office\n\
    ip: 10.0.0.6\n\
    port: 9101\n\
  - id: DISABLED\n\
    name: Retired\n\
    ip: 10.0.0.7\n\
    enabled: false\n";

    const ROUTING: &str = "defaultPrinterId: OFFICE\n\
rules:\n\
  - id: r1\n\
    when:\n\
      all:\n\
        - field: stagingLocation\n\
          op: EQUALS\n\
          value: ROSSI\n\
    then:\n\
      printerId: DISPATCH\n";

    fn ctx(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn select_printer_resolves_rule_match_then_falls_back_to_default() {
        let reg = PrinterRegistry::load(INVENTORY, ROUTING).unwrap();
        assert_eq!(reg.select_printer(&ctx(&[("stagingLocation", "rossi")])).unwrap().id, "DISPATCH");
        assert_eq!(reg.select_printer(&ctx(&[("stagingLocation", "UNKNOWN")])).unwrap().id, "OFFICE");
        assert_eq!(reg.select_printer(&ctx(&[])).unwrap().id, "OFFICE");
    }

    #[test]
    fn rule_targeting_unknown_printer_is_config_error() {
        let routing = "defaultPrinterId: OFFICE\nrules:\n  - id: r1\n    when:\n      all:\n        - field: stagingLocation\n          op: EQUALS\n          value: ROSSI\n    then:\n      printerId: GHOST\n";
        let reg = PrinterRegistry::load(INVENTORY, routing).unwrap();
        assert!(reg.select_printer(&ctx(&[("stagingLocation", "rossi")])).is_err());
    }

    #[test]
    fn unknown_operator_fails_the_considered_rule() {
        let routing = "defaultPrinterId: OFFICE\nrules:\n  - id: r1\n    when:\n      all:\n        - field: stagingLocation\n          op: FUZZY_MATCHES\n          value: ROSSI\n    then:\n      printerId: DISPATCH\n";
        let reg = PrinterRegistry::load(INVENTORY, routing).unwrap();
        assert!(reg.select_printer(&ctx(&[("stagingLocation", "rossi")])).is_err());
    }

    #[test]
    fn unknown_operator_on_rule_whose_field_is_absent_is_not_an_error() {
        let routing = "defaultPrinterId: OFFICE\nrules:\n  - id: r1\n    when:\n      all:\n        - field: stagingLocation\n          op: FUZZY_MATCHES\n          value: ROSSI\n    then:\n      printerId: DISPATCH\n";
        let reg = PrinterRegistry::load(INVENTORY, routing).unwrap();
        assert_eq!(reg.select_printer(&ctx(&[])).unwrap().id, "OFFICE");
    }

    #[test]
    fn find_printer_hides_disabled() {
        let reg = PrinterRegistry::load(INVENTORY, ROUTING).unwrap();
        assert!(reg.find_printer("DISABLED").is_none());
        assert!(reg.find_printer("GHOST").is_none());
        assert!(reg.find_printer("OFFICE").is_some());
    }
}
