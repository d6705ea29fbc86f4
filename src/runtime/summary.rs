//! Name-only views of a merged configuration.
//!
//! Rules and callables cannot be printed or compared, so a summary records
//! their labels, counts and priorities instead. The text rendering is one
//! fact per line, which keeps line diffs between two summaries readable.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::{HandlerCategory, RuleMap};
use crate::options::OptionTree;
use crate::priority::Priority;
use crate::runtime::active::ActiveConfiguration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationSummary {
    pub packages: Vec<String>,
    pub handlers: BTreeMap<HandlerCategory, Vec<String>>,
    pub fallbacks: BTreeMap<HandlerCategory, String>,
    pub stack_items: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    pub node_factories: BTreeMap<String, String>,
    /// Merged option defaults, or the engine's resolved options once
    /// [`with_options`](Self::with_options) has replaced them.
    pub options: OptionTree,
    pub preprocessors: Vec<Option<Priority>>,
    pub postprocessors: Vec<Option<Priority>>,
    pub init_hooks: Vec<Priority>,
    pub ready_hooks: Vec<Priority>,
}

fn labels(rules: &RuleMap) -> BTreeMap<String, String> {
    rules
        .iter()
        .map(|(key, rule)| (key.clone(), rule.label().to_string()))
        .collect()
}

impl From<&ActiveConfiguration> for ConfigurationSummary {
    fn from(active: &ActiveConfiguration) -> Self {
        Self {
            packages: active.packages().to_vec(),
            handlers: active
                .handler_lists()
                .iter()
                .map(|(category, names)| (category, names.to_vec()))
                .collect(),
            fallbacks: active
                .fallbacks()
                .iter()
                .map(|(category, rule)| (*category, rule.label().to_string()))
                .collect(),
            stack_items: labels(active.stack_items()),
            tags: labels(active.tags()),
            node_factories: labels(active.node_factories()),
            options: active.options().clone(),
            preprocessors: active.preprocessors().iter().map(|p| p.priority()).collect(),
            postprocessors: active.postprocessors().iter().map(|p| p.priority()).collect(),
            init_hooks: active.init_chain().entries().map(|(_, p)| p).collect(),
            ready_hooks: active.ready_chain().entries().map(|(_, p)| p).collect(),
        }
    }
}

impl ConfigurationSummary {
    /// Replaces the merged defaults with `options`, typically what a host
    /// engine resolved after applying user options.
    pub fn with_options(mut self, options: &OptionTree) -> Self {
        self.options = options.clone();
        self
    }
}

fn write_options(f: &mut fmt::Formatter<'_>, prefix: &str, value: &Value) -> fmt::Result {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, inner) in map {
                write_options(f, &format!("{prefix}.{key}"), inner)?;
            }
            Ok(())
        }
        other => writeln!(f, "option {prefix} = {other}"),
    }
}

fn write_processors(
    f: &mut fmt::Formatter<'_>,
    stage: &str,
    processors: &[Option<Priority>],
) -> fmt::Result {
    for (position, priority) in processors.iter().enumerate() {
        match priority {
            Some(priority) => writeln!(f, "{stage} #{position} priority {priority}")?,
            None => writeln!(f, "{stage} #{position}")?,
        }
    }
    Ok(())
}

impl fmt::Display for ConfigurationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "packages: {}", self.packages.join(", "))?;
        for (category, names) in &self.handlers {
            writeln!(f, "handler {category}: {}", names.join(", "))?;
        }
        for (category, label) in &self.fallbacks {
            writeln!(f, "fallback {category}: {label}")?;
        }
        for (kind, label) in &self.stack_items {
            writeln!(f, "stack item {kind}: {label}")?;
        }
        for (scheme, label) in &self.tags {
            writeln!(f, "tags {scheme}: {label}")?;
        }
        for (kind, label) in &self.node_factories {
            writeln!(f, "node {kind}: {label}")?;
        }
        for (key, value) in self.options.iter() {
            write_options(f, key, value)?;
        }
        write_processors(f, "preprocessor", &self.preprocessors)?;
        write_processors(f, "postprocessor", &self.postprocessors)?;
        writeln!(f, "init hooks: {:?}", self.init_hooks)?;
        write!(f, "ready hooks: {:?}", self.ready_hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigurationEntry, Rule};
    use crate::engine::FilterData;

    #[test]
    fn summary_lists_labels_and_flattened_options() {
        let entry = ConfigurationEntry::builder("ams")
            .handlers(HandlerCategory::Environment, ["AMSmath-environment"])
            .tag("ams", Rule::named("ams.AmsTags"))
            .option("ams", serde_json::json!({"multlineWidth": "100%"}))
            .postprocessor_at(|_d: &mut FilterData| (), -2)
            .build()
            .unwrap();
        let mut active = ActiveConfiguration::new();
        active.append(&entry);
        let text = active.summary().to_string();
        assert!(text.contains("handler environment: AMSmath-environment"));
        assert!(text.contains("tags ams: ams.AmsTags"));
        assert!(text.contains("option ams.multlineWidth = \"100%\""));
        assert!(text.contains("postprocessor #0 priority -2"));
    }

    #[test]
    fn resolved_options_replace_the_defaults() {
        let entry = ConfigurationEntry::builder("base")
            .option("tags", "none")
            .option("tagSide", "right")
            .build()
            .unwrap();
        let mut active = ActiveConfiguration::new();
        active.append(&entry);
        let resolved =
            OptionTree::from_json(serde_json::json!({"tags": "ams", "tagSide": "right"})).unwrap();
        let text = active.summary().with_options(&resolved).to_string();
        assert!(text.contains("option tags = \"ams\""));
        assert!(!text.contains("option tags = \"none\""));
        assert!(text.contains("option tagSide = \"right\""));
    }

    #[test]
    fn summary_serializes_categories_in_lowercase() {
        let entry = ConfigurationEntry::builder("base")
            .handlers(HandlerCategory::Macro, ["macros"])
            .build()
            .unwrap();
        let mut active = ActiveConfiguration::new();
        active.append(&entry);
        let json = serde_json::to_value(active.summary()).unwrap();
        assert_eq!(json["handlers"]["macro"], serde_json::json!(["macros"]));
        assert_eq!(json["packages"], serde_json::json!(["base"]));
    }
}
