//! Middlewares command - List available obfuscation middlewares

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use ldapmorph::middleware::{AttrListMiddlewareKind, FilterMiddlewareKind};

use crate::cli::{Context, OutputFormat};

pub fn run(ctx: &Context, verbose: bool) -> Result<()> {
    if ctx.format == OutputFormat::Json {
        let filter: Vec<_> = FilterMiddlewareKind::all()
            .iter()
            .map(|k| {
                json!({
                    "name": k.as_str(),
                    "description": k.description(),
                    "options": k.option_keys(),
                })
            })
            .collect();
        let attrs: Vec<_> = AttrListMiddlewareKind::all()
            .iter()
            .map(|k| {
                json!({
                    "name": k.as_str(),
                    "description": k.description(),
                    "options": k.option_keys(),
                })
            })
            .collect();
        let out = json!({ "filter": filter, "attributes": attrs });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Available Middlewares".cyan().bold());
    println!("{}", "=".repeat(60));
    println!();

    println!("{}", "Filter (--chain for 'filter')".yellow().bold());
    println!();
    for kind in FilterMiddlewareKind::all() {
        print_entry(kind.as_str(), kind.description(), kind.option_keys(), ctx, verbose);
    }
    println!();

    println!("{}", "Attribute list (--chain for 'attrs')".yellow().bold());
    println!();
    for kind in AttrListMiddlewareKind::all() {
        print_entry(kind.as_str(), kind.description(), kind.option_keys(), ctx, verbose);
    }
    println!();

    println!(
        "{}",
        format!(
            "Total: {} filter, {} attribute list middlewares",
            FilterMiddlewareKind::all().len(),
            AttrListMiddlewareKind::all().len()
        )
        .dimmed()
    );

    Ok(())
}

fn print_entry(name: &str, description: &str, keys: &[&str], ctx: &Context, verbose: bool) {
    println!("  {} {}", format!("{:18}", name).green(), description);
    if verbose {
        for key in keys {
            let value = ctx.options.get(key).unwrap_or_default();
            println!("    {} = {}", key.dimmed(), value);
        }
    }
}
