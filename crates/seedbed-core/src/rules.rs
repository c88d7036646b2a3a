use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-table generation rules, keyed by table name.
///
/// ```yaml
/// rules:
///   users:
///     num: 5
///     columns:
///       email: email
///       status: oneof[active%80, banned%20]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RulesConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, TableRule>,
}

/// Row count and column rule strings for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableRule {
    /// Rows to generate; 0 skips the table.
    #[serde(default, alias = "rows")]
    pub num: u64,
    /// Column name to rule string (e.g. `int(1,100)`, `constant[x]`).
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl RulesConfig {
    pub fn table(&self, name: &str) -> Option<&TableRule> {
        self.rules.get(name)
    }
}
