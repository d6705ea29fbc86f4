//! The host engine seam.
//!
//! A parser configuration needs three things from the engine that drives it:
//! two filter chains to install processors into, and an option-application
//! step. [`HostEngine`] names them. [`Engine`] is a minimal host used by the
//! CLI and the tests.

use serde_json::{Map, Value};

use crate::config::FilterFn;
use crate::errors::ConfigResult;
use crate::options::OptionTree;
use crate::priority::{CallbackChain, Flow};

/// Filters installed into a host engine, in priority order.
pub type FilterChain = CallbackChain<FilterFn>;

/// What a pre- or postprocessing filter operates on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterData {
    pub input: String,
    pub properties: Map<String, Value>,
}

impl FilterData {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            properties: Map::new(),
        }
    }
}

pub trait HostEngine {
    fn pre_filters(&mut self) -> &mut FilterChain;

    fn post_filters(&mut self) -> &mut FilterChain;

    /// Merges option defaults into the engine's options, then applies user
    /// options on top; `overrides` adds further user options first.
    fn apply_options(
        &mut self,
        defaults: &OptionTree,
        overrides: Option<&OptionTree>,
    ) -> ConfigResult<()>;
}

/// A reference host engine holding filters and resolved options.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pre: FilterChain,
    post: FilterChain,
    user_options: OptionTree,
    options: OptionTree,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that applies `user_options` over every default it receives.
    pub fn with_user_options(user_options: OptionTree) -> Self {
        Self {
            user_options,
            ..Self::default()
        }
    }

    /// Resolved options: defaults with user options applied.
    pub fn options(&self) -> &OptionTree {
        &self.options
    }

    pub fn user_options(&self) -> &OptionTree {
        &self.user_options
    }

    pub fn run_preprocessors(&self, data: &mut FilterData) -> Flow {
        self.pre.execute(|filter| filter(&mut *data))
    }

    pub fn run_postprocessors(&self, data: &mut FilterData) -> Flow {
        self.post.execute(|filter| filter(&mut *data))
    }
}

impl HostEngine for Engine {
    fn pre_filters(&mut self) -> &mut FilterChain {
        &mut self.pre
    }

    fn post_filters(&mut self) -> &mut FilterChain {
        &mut self.post
    }

    fn apply_options(
        &mut self,
        defaults: &OptionTree,
        overrides: Option<&OptionTree>,
    ) -> ConfigResult<()> {
        let mut user = self.user_options.clone();
        if let Some(extra) = overrides {
            user.overlay(extra);
        }
        let mut resolved = self.options.clone();
        resolved.merge_defaults(defaults);
        resolved.apply_user(&user)?;
        self.options = resolved;
        self.user_options = user;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::filter_fn;
    use crate::errors::ConfigError;
    use serde_json::json;

    fn tree(value: Value) -> OptionTree {
        OptionTree::from_json(value).unwrap()
    }

    #[test]
    fn user_options_override_defaults() {
        let mut engine = Engine::with_user_options(tree(json!({"tags": "ams"})));
        engine
            .apply_options(&tree(json!({"tags": "none", "tagSide": "right"})), None)
            .unwrap();
        assert_eq!(engine.options().get("tags"), Some(&json!("ams")));
        assert_eq!(engine.options().get("tagSide"), Some(&json!("right")));
    }

    #[test]
    fn user_options_without_defaults_fail() {
        let mut engine = Engine::with_user_options(tree(json!({"color": {"padding": "5px"}})));
        let err = engine.apply_options(&OptionTree::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref path } if path == "color"));
    }

    #[test]
    fn overrides_persist_for_later_applications() {
        let mut engine = Engine::new();
        let color = tree(json!({"color": {"padding": "5px"}}));
        engine
            .apply_options(&color, Some(&tree(json!({"color": {"padding": "1px"}}))))
            .unwrap();
        engine.apply_options(&tree(json!({"tags": "none"})), None).unwrap();
        assert_eq!(engine.options().get_path("color.padding"), Some(&json!("1px")));
        assert_eq!(engine.user_options().get_path("color.padding"), Some(&json!("1px")));
    }

    #[test]
    fn filters_run_by_priority() {
        let mut engine = Engine::new();
        engine
            .post_filters()
            .add(filter_fn(|data: &mut FilterData| data.input.push('b')), 10);
        engine
            .post_filters()
            .add(filter_fn(|data: &mut FilterData| data.input.push('a')), -4);
        let mut data = FilterData::new(">");
        assert_eq!(engine.run_postprocessors(&mut data), Flow::Continue);
        assert_eq!(data.input, ">ab");
    }
}
