//! Options command - Show option keys with their effective values

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use ldapmorph::options::default_value;

use crate::cli::{Context, OutputFormat};

pub fn run(ctx: &Context) -> Result<()> {
    let entries = ctx.options.entries();

    if ctx.format == OutputFormat::Json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("{}", "Middleware Options".cyan().bold());
    println!("{}", "=".repeat(60));
    println!();

    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in &entries {
        let changed = default_value(key).is_some_and(|d| d != *value);
        let shown = if changed {
            format!("{} (default {})", value.yellow(), default_value(key).unwrap_or_default())
        } else {
            value.to_string()
        };
        println!("  {}  {}", format!("{:width$}", key, width = width).green(), shown);
    }

    println!();
    println!(
        "{}",
        "Override with --set KEY=VALUE or an [options] table in ldapmorph.toml".dimmed()
    );

    Ok(())
}
