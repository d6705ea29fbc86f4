//! End-to-end tests for building, configuring and extending parser
//! configurations.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use texpack::config::{ConfigurationEntry, ConfigurationRegistry, HandlerCategory, Rule};
use texpack::engine::{Engine, FilterData, HostEngine};
use texpack::options::OptionTree;
use texpack::priority::Flow;
use texpack::runtime::{ActiveConfiguration, HandlerMaps, PreparedConfiguration, Resolution};
use texpack::ConfigError;

fn tree(value: serde_json::Value) -> OptionTree {
    OptionTree::from_json(value).unwrap()
}

#[cfg(test)]
mod construction_tests {
    use super::*;

    #[test]
    fn strict_extension_scenario() {
        let flag = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&flag);
        let mut registry = ConfigurationRegistry::new();
        registry
            .define(
                ConfigurationEntry::builder("base")
                    .priority(5)
                    .handlers(HandlerCategory::Macro, ["m-base"])
                    .option("strict", false),
            )
            .unwrap();
        registry
            .define(
                ConfigurationEntry::builder("strict-ext")
                    .priority(10)
                    .handlers(HandlerCategory::Macro, ["m-strict"])
                    .option("strict", true)
                    .init(move |_config: &mut ActiveConfiguration| seen.store(true, Ordering::SeqCst)),
            )
            .unwrap();

        let prepared = PreparedConfiguration::new(&registry, ["base", "strict-ext"]).unwrap();
        let active = prepared.active();
        assert_eq!(active.handlers(HandlerCategory::Macro), ["m-strict", "m-base"]);
        assert_eq!(active.options().get("strict"), Some(&json!(false)));
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn unknown_packages_are_skipped() {
        let mut registry = ConfigurationRegistry::new();
        registry.define(ConfigurationEntry::builder("base")).unwrap();
        let prepared = PreparedConfiguration::new(&registry, ["physics", "base", "bbox"]).unwrap();
        assert_eq!(prepared.active().packages(), ["base"]);
    }

    #[test]
    fn equal_priorities_keep_request_order() {
        let mut registry = ConfigurationRegistry::new();
        for name in ["a", "b", "c"] {
            registry
                .define(ConfigurationEntry::builder(name).handlers(HandlerCategory::Macro, [name]))
                .unwrap();
        }
        let prepared = PreparedConfiguration::new(&registry, ["c", "a", "b"]).unwrap();
        assert_eq!(prepared.active().packages(), ["c", "a", "b"]);
        assert_eq!(prepared.active().handlers(HandlerCategory::Macro), ["b", "a", "c"]);
    }

    #[test]
    fn re_registration_leaves_built_parsers_alone() {
        let mut registry = ConfigurationRegistry::new();
        registry
            .define(ConfigurationEntry::builder("ext").handlers(HandlerCategory::Macro, ["first"]))
            .unwrap();
        let before = PreparedConfiguration::new(&registry, ["ext"]).unwrap();
        registry
            .define(ConfigurationEntry::builder("ext").handlers(HandlerCategory::Macro, ["second"]))
            .unwrap();
        let after = PreparedConfiguration::new(&registry, ["ext"]).unwrap();

        assert_eq!(registry.lookup("ext").unwrap().handlers()[HandlerCategory::Macro], ["second"]);
        assert_eq!(before.active().handlers(HandlerCategory::Macro), ["first"]);
        assert_eq!(after.active().handlers(HandlerCategory::Macro), ["second"]);
    }

    #[test]
    fn stop_suppresses_later_init_hooks() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut registry = ConfigurationRegistry::new();
        let counter = Arc::clone(&runs);
        registry
            .define(ConfigurationEntry::builder("guard").init_at(
                |_config: &mut ActiveConfiguration| Flow::Stop,
                1,
            ))
            .unwrap();
        registry
            .define(ConfigurationEntry::builder("default").init(
                move |_config: &mut ActiveConfiguration| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ))
            .unwrap();
        PreparedConfiguration::new(&registry, ["default", "guard"]).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}

#[cfg(test)]
mod configure_tests {
    use super::*;

    #[test]
    fn processors_install_in_merge_order() {
        let mut registry = ConfigurationRegistry::new();
        for (name, mark) in [("e1", "p1"), ("e2", "p2")] {
            registry
                .define(
                    ConfigurationEntry::builder(name)
                        .postprocessor(move |data: &mut FilterData| data.input.push_str(mark)),
                )
                .unwrap();
        }
        let mut engine = Engine::new();
        PreparedConfiguration::new(&registry, ["e1", "e2"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();
        let mut data = FilterData::new("");
        engine.run_postprocessors(&mut data);
        assert_eq!(data.input, "p1p2");
    }

    #[test]
    fn ready_hooks_see_resolved_engine_options() {
        let observed = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&observed);
        let mut registry = ConfigurationRegistry::new();
        registry
            .define(
                ConfigurationEntry::builder("tags")
                    .option("tags", "none")
                    .ready_with_engine(move |_c: &mut ActiveConfiguration, engine: &mut dyn HostEngine| {
                        engine.pre_filters().push(texpack::config::filter_fn(
                            |data: &mut FilterData| {
                                data.properties.insert("tagged".into(), json!(true));
                            },
                        ));
                        *slot.lock().unwrap() = Some(engine.post_filters().len());
                    }),
            )
            .unwrap();
        let mut engine = Engine::with_user_options(tree(json!({"tags": "ams"})));
        let parser = PreparedConfiguration::new(&registry, ["tags"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();

        assert_eq!(engine.options().get("tags"), Some(&json!("ams")));
        assert_eq!(parser.active().options().get("tags"), Some(&json!("none")));
        assert_eq!(*observed.lock().unwrap(), Some(0));
        let mut data = FilterData::new("x");
        engine.run_preprocessors(&mut data);
        assert_eq!(data.properties.get("tagged"), Some(&json!(true)));
    }

    #[test]
    fn unknown_user_option_fails_configuration() {
        let mut registry = ConfigurationRegistry::new();
        registry.define(ConfigurationEntry::builder("base").option("tags", "none")).unwrap();
        let mut engine = Engine::with_user_options(tree(json!({"tagz": "ams"})));
        let err = PreparedConfiguration::new(&registry, ["base"])
            .unwrap()
            .configure(&mut engine)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref path } if path == "tagz"));
    }

    #[test]
    fn resolve_walks_the_flattened_index() {
        let mut registry = ConfigurationRegistry::new();
        registry
            .define(
                ConfigurationEntry::builder("base")
                    .handlers(HandlerCategory::Macro, ["macros"])
                    .fallback(HandlerCategory::Macro, Rule::named("base.csUndefined")),
            )
            .unwrap();
        registry
            .define(ConfigurationEntry::builder("ams").handlers(HandlerCategory::Macro, ["AMSmath-macros"]))
            .unwrap();
        let prepared = PreparedConfiguration::new(&registry, ["base", "ams"]).unwrap();
        let mut maps = HandlerMaps::new();
        maps.define("macros", ["frac"]).define("AMSmath-macros", ["frac", "dfrac"]);

        let active = prepared.active();
        let frac = active.resolve(HandlerCategory::Macro, "frac", &maps);
        assert_eq!(frac.map_name(), Some("AMSmath-macros"));
        assert!(matches!(
            active.resolve(HandlerCategory::Macro, "foo", &maps),
            Resolution::Fallback(rule) if rule.label() == "base.csUndefined"
        ));
        assert!(matches!(
            active.resolve(HandlerCategory::Environment, "align", &maps),
            Resolution::Unhandled
        ));
    }
}

#[cfg(test)]
mod extension_tests {
    use super::*;

    fn counting(name: &str, map: &str, log: &Arc<Mutex<Vec<String>>>) -> texpack::config::EntryBuilder {
        let init_log = Arc::clone(log);
        let ready_log = Arc::clone(log);
        let init_name = format!("{name}:init");
        let ready_name = format!("{name}:ready");
        ConfigurationEntry::builder(name)
            .handlers(HandlerCategory::Macro, [map])
            .init(move |_c: &mut ActiveConfiguration| init_log.lock().unwrap().push(init_name.clone()))
            .ready(move |_c: &mut ActiveConfiguration| ready_log.lock().unwrap().push(ready_name.clone()))
    }

    #[test]
    fn extension_runs_only_the_new_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ConfigurationRegistry::new();
        for (name, map) in [("e1", "a"), ("e2", "b"), ("e3", "c")] {
            registry.define(counting(name, map, &log)).unwrap();
        }
        let mut engine = Engine::new();
        let mut parser = PreparedConfiguration::new(&registry, ["e1", "e2"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();
        log.lock().unwrap().clear();

        assert!(parser.extend(&registry, "e3", &mut engine, None).unwrap());
        assert_eq!(*log.lock().unwrap(), ["e3:init", "e3:ready"]);
        assert_eq!(parser.active().handlers(HandlerCategory::Macro), ["c", "b", "a"]);
        assert_eq!(parser.active().index().maps(HandlerCategory::Macro), ["c", "b", "a"]);
    }

    #[test]
    fn extension_forwards_user_overrides() {
        let mut registry = ConfigurationRegistry::new();
        registry.define(ConfigurationEntry::builder("base")).unwrap();
        registry
            .define(ConfigurationEntry::builder("color").option("color", json!({"padding": "5px"})))
            .unwrap();
        let mut engine = Engine::new();
        let mut parser = PreparedConfiguration::new(&registry, ["base"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();
        let overrides = tree(json!({"color": {"padding": "2px"}}));
        parser
            .extend(&registry, "color", &mut engine, Some(&overrides))
            .unwrap();
        assert_eq!(engine.options().get_path("color.padding"), Some(&json!("2px")));
        assert_eq!(parser.active().options().get_path("color.padding"), Some(&json!("5px")));
    }

    #[test]
    fn extension_installs_only_new_processors() {
        let mut registry = ConfigurationRegistry::new();
        for (name, mark) in [("first", "1"), ("second", "2")] {
            registry
                .define(
                    ConfigurationEntry::builder(name)
                        .preprocessor(move |data: &mut FilterData| data.input.push_str(mark)),
                )
                .unwrap();
        }
        let mut engine = Engine::new();
        let mut parser = PreparedConfiguration::new(&registry, ["first"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();
        parser.extend(&registry, "second", &mut engine, None).unwrap();
        assert_eq!(engine.pre_filters().len(), 2);
        let mut data = FilterData::new("");
        engine.run_preprocessors(&mut data);
        assert_eq!(data.input, "12");
    }

    #[test]
    fn failed_extension_can_be_retried() {
        let ready_runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ready_runs);
        let mut registry = ConfigurationRegistry::new();
        registry.define(ConfigurationEntry::builder("base")).unwrap();
        registry
            .define(
                ConfigurationEntry::builder("color")
                    .handlers(HandlerCategory::Macro, ["color-macros"])
                    .option("color", json!({"padding": "5px"}))
                    .preprocessor(|data: &mut FilterData| data.input.push('c'))
                    .ready(move |_c: &mut ActiveConfiguration| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .unwrap();
        let mut engine = Engine::new();
        let mut parser = PreparedConfiguration::new(&registry, ["base"])
            .unwrap()
            .configure(&mut engine)
            .unwrap();

        let bad = tree(json!({"colour": 1}));
        let err = parser
            .extend(&registry, "color", &mut engine, Some(&bad))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { ref path } if path == "colour"));
        assert_eq!(parser.active().packages(), ["base"]);
        assert!(parser.active().handlers(HandlerCategory::Macro).is_empty());
        assert!(parser.active().index().maps(HandlerCategory::Macro).is_empty());
        assert_eq!(engine.pre_filters().len(), 0);

        assert!(parser.extend(&registry, "color", &mut engine, None).unwrap());
        assert_eq!(parser.active().packages(), ["base", "color"]);
        assert_eq!(ready_runs.load(Ordering::SeqCst), 1);
        assert_eq!(engine.pre_filters().len(), 1);
    }

    #[test]
    fn extension_installs_what_its_init_hook_appends() {
        let ready_runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ready_runs);
        let local = Arc::new(
            ConfigurationEntry::local()
                .handlers(HandlerCategory::Macro, ["new-Command"])
                .preprocessor(|data: &mut FilterData| data.input.push('n'))
                .ready(move |_c: &mut ActiveConfiguration| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .build()
                .unwrap(),
        );
        let mut registry = ConfigurationRegistry::new();
        registry.define(ConfigurationEntry::builder("base")).unwrap();
        registry
            .define(
                ConfigurationEntry::builder("nc")
                    .handlers(HandlerCategory::Macro, ["Newcommand-macros"])
                    .init(move |config: &mut ActiveConfiguration| config.append(&local)),
            )
            .unwrap();

        let mut built = Engine::new();
        PreparedConfiguration::new(&registry, ["base", "nc"])
            .unwrap()
            .configure(&mut built)
            .unwrap();

        let mut extended = Engine::new();
        let mut parser = PreparedConfiguration::new(&registry, ["base"])
            .unwrap()
            .configure(&mut extended)
            .unwrap();
        parser.extend(&registry, "nc", &mut extended, None).unwrap();

        assert_eq!(built.pre_filters().len(), 1);
        assert_eq!(extended.pre_filters().len(), 1);
        assert_eq!(parser.active().preprocessors().len(), 1);
        assert_eq!(ready_runs.load(Ordering::SeqCst), 2);
        assert_eq!(
            parser.active().index().maps(HandlerCategory::Macro),
            ["new-Command", "Newcommand-macros"]
        );
    }
}
