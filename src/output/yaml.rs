// src/output/yaml.rs

use crate::result::AggregateResult;

/// Block-style YAML of `{ name: data }`.
pub fn render(aggregate: &AggregateResult) -> Result<String, String> {
    serde_yaml::to_string(&aggregate.to_value()).map_err(|e| e.to_string())
}
