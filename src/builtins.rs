//! Built-in packages.
//!
//! Declared through the same public API any package author uses:
//!
//! - `base`: the core TeX handler maps, stack items and fallbacks.
//! - `ams`: AMS math and symbol maps, AMS tagging and multline options.
//! - `newcommand`: user-defined macros, appended through a local entry.
//! - `noundefined`: renders undefined macros instead of failing.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::json;

use crate::config::{ConfigurationEntry, ConfigurationRegistry, Rule};
use crate::engine::FilterData;
use crate::errors::ConfigResult;
use crate::options::OptionTree;
use crate::runtime::ActiveConfiguration;

use crate::config::HandlerCategory::{Character, Delimiter, Environment, Macro};

static DEFAULT_REGISTRY: OnceCell<ConfigurationRegistry> = OnceCell::new();

/// Shared registry holding every built-in package, built on first use.
pub fn default_registry() -> ConfigResult<&'static ConfigurationRegistry> {
    DEFAULT_REGISTRY.get_or_try_init(|| {
        let mut registry = ConfigurationRegistry::new();
        register_builtin_packages(&mut registry)?;
        Ok(registry)
    })
}

/// Registers the built-in packages into `registry`.
pub fn register_builtin_packages(registry: &mut ConfigurationRegistry) -> ConfigResult<()> {
    registry.add(base()?)?;
    registry.add(ams()?)?;
    registry.add(newcommand()?)?;
    registry.add(noundefined()?)?;
    Ok(())
}

fn options(value: serde_json::Value) -> OptionTree {
    OptionTree::from_json(value).unwrap_or_default()
}

fn base() -> ConfigResult<ConfigurationEntry> {
    let mut builder = ConfigurationEntry::builder("base")
        .handlers(Character, ["command", "special", "letter", "digit"])
        .handlers(Delimiter, ["delimiter"])
        .handlers(
            Macro,
            [
                "delimiter",
                "macros",
                "lcGreek",
                "ucGreek",
                "mathchar0mi",
                "mathchar0mo",
                "mathchar7",
            ],
        )
        .handlers(Environment, ["environment"])
        .fallback(Character, Rule::named("base.Other"))
        .fallback(Macro, Rule::named("base.csUndefined"))
        .fallback(Environment, Rule::named("base.envUndefined"))
        .tag("base", Rule::named("base.BaseTags"))
        .options(options(json!({
            "maxMacros": 1000,
            "maxBuffer": 5120,
            "tags": "none",
            "tagSide": "right",
            "tagIndent": "0.8em"
        })))
        .preprocessor(|data: &mut FilterData| {
            if data.input.contains('\r') {
                data.input = data.input.replace("\r\n", "\n");
            }
        })
        .postprocessor_at(
            |data: &mut FilterData| {
                let trimmed = data.input.trim_end().len();
                data.input.truncate(trimmed);
            },
            -4,
        );
    for kind in [
        "start", "stop", "open", "close", "prime", "subsup", "over", "left", "right", "begin",
        "end", "style", "position", "cell", "array", "equation",
    ] {
        builder = builder.stack_item(kind, Rule::named(format!("base.{kind}")));
    }
    builder.build()
}

fn ams() -> ConfigResult<ConfigurationEntry> {
    let operators = Arc::new(
        ConfigurationEntry::local()
            .handlers(Macro, ["AMSmath-operator"])
            .priority(-1)
            .build()?,
    );
    ConfigurationEntry::builder("ams")
        .handlers(Character, ["AMSmath-operatorLetter"])
        .handlers(Delimiter, ["AMSsymbols-delimiter", "AMSmath-delimiter"])
        .handlers(
            Macro,
            [
                "AMSsymbols-mathchar0mi",
                "AMSsymbols-mathchar0mo",
                "AMSsymbols-delimiter",
                "AMSsymbols-macros",
                "AMSmath-mathchar0mo",
                "AMSmath-macros",
                "AMSmath-delimiter",
            ],
        )
        .handlers(Environment, ["AMSmath-environment"])
        .stack_item("multline", Rule::named("ams.MultlineItem"))
        .stack_item("flalign", Rule::named("ams.FlalignItem"))
        .tag("ams", Rule::named("ams.AmsTags"))
        .options(options(json!({
            "multlineWidth": "",
            "ams": {"multlineWidth": "100%", "multlineIndent": "1em"}
        })))
        .init(move |config: &mut ActiveConfiguration| config.append(&operators))
        .build()
}

fn newcommand() -> ConfigResult<ConfigurationEntry> {
    let definitions = Arc::new(
        ConfigurationEntry::local()
            .handlers(Delimiter, ["new-Delimiter"])
            .handlers(Macro, ["new-Delimiter", "new-Command"])
            .handlers(Environment, ["new-Environment"])
            .priority(-1)
            .build()?,
    );
    ConfigurationEntry::builder("newcommand")
        .handlers(Macro, ["Newcommand-macros"])
        .stack_item("beginEnv", Rule::named("newcommand.BeginEnvItem"))
        .option("maxMacros", 1000)
        .init(move |config: &mut ActiveConfiguration| config.append(&definitions))
        .build()
}

fn noundefined() -> ConfigResult<ConfigurationEntry> {
    ConfigurationEntry::builder("noundefined")
        .fallback(Macro, Rule::named("noundefined.Undefined"))
        .option(
            "noundefined",
            json!({"color": "red", "background": "", "size": ""}),
        )
        .build()
}
