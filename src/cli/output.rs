//! Handles all user-facing output for the CLI.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::{ConfigurationEntry, Processor};
use crate::runtime::ConfigurationSummary;

/// Prints a package's contributions, one per line.
pub fn print_entry(entry: &ConfigurationEntry) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    println!(
        "{} (parser {}, priority {})",
        entry.name(),
        entry.parser(),
        entry.priority()
    );
    let _ = stdout.reset();

    for (category, names) in entry.handlers().iter() {
        if !names.is_empty() {
            println!("  handler {category}: {}", names.join(", "));
        }
    }
    for (category, rule) in entry.fallbacks() {
        println!("  fallback {category}: {}", rule.label());
    }
    for (kind, rule) in entry.stack_items() {
        println!("  stack item {kind}: {}", rule.label());
    }
    for (scheme, rule) in entry.tags() {
        println!("  tags {scheme}: {}", rule.label());
    }
    for (kind, rule) in entry.node_factories() {
        println!("  node {kind}: {}", rule.label());
    }
    for (key, value) in entry.options().iter() {
        println!("  option {key} = {value}");
    }
    print_processors("preprocessor", entry.preprocessors());
    print_processors("postprocessor", entry.postprocessors());
    if let Some(hook) = entry.init_hook() {
        println!("  init hook, priority {}", hook.priority);
    }
    if let Some(hook) = entry.ready_hook() {
        println!(
            "  ready hook, priority {}, {} argument(s)",
            hook.priority,
            hook.callable.consumed_args()
        );
    }
}

/// Prints a merged configuration as text or pretty JSON.
pub fn print_summary(summary: &ConfigurationSummary, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

/// Prints a coloured line diff between two merged configurations.
pub fn print_summary_diff(before: &ConfigurationSummary, after: &ConfigurationSummary) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let changeset = Changeset::new(&before.to_string(), &after.to_string(), "\n");
    print_diff(&mut stdout, &changeset.diffs);
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_processors(stage: &str, processors: &[Processor]) {
    for (position, processor) in processors.iter().enumerate() {
        match processor.priority() {
            Some(priority) => println!("  {stage} #{position}, priority {priority}"),
            None => println!("  {stage} #{position}"),
        }
    }
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        let (marker, color, text) = match diff {
            Difference::Same(text) => (' ', None, text),
            Difference::Add(text) => ('+', Some(Color::Green), text),
            Difference::Rem(text) => ('-', Some(Color::Red), text),
        };
        match color {
            Some(color) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
            }
            None => {
                let _ = stdout.reset();
            }
        }
        for line in text.lines() {
            println!("{marker}{line}");
        }
    }
    let _ = stdout.reset();
}
