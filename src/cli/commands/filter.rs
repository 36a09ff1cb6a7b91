//! Filter command - Obfuscate a search filter given as JSON

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use ldapmorph::filter::Filter;
use ldapmorph::middleware::FilterMiddlewareKind;
use ldapmorph::LdapMorphError;

use super::read_input;
use crate::cli::{Context, OutputFormat};

#[derive(Serialize)]
struct FilterReport {
    original: String,
    chain: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    variants: Vec<FilterVariant>,
}

#[derive(Serialize)]
struct FilterVariant {
    text: String,
    filter: Filter,
}

pub fn run(ctx: &Context, input: &str, chain: &str, count: usize) -> Result<()> {
    let chain = FilterMiddlewareKind::parse_chain(chain)?;
    let (name, source) = read_input(input)?;
    let filter: Filter = serde_json::from_str(&source)
        .map_err(|e| LdapMorphError::invalid_filter(&name, &source, &e))?;

    let mut engine = ctx.engine(&chain, &[]);
    tracing::debug!("Obfuscating {} with chain {:?}", filter, engine.filter_chain());

    let variants: Vec<Filter> = (0..count.max(1))
        .map(|_| engine.obfuscate_filter(&filter))
        .collect();

    let report = FilterReport {
        original: filter.to_string(),
        chain: engine.filter_chain(),
        seed: ctx.seed,
        variants: variants
            .into_iter()
            .map(|f| FilterVariant {
                text: f.to_string(),
                filter: f,
            })
            .collect(),
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

fn print_text(report: &FilterReport) {
    println!("{} {}", "Original:".cyan().bold(), report.original);
    let chain = if report.chain.is_empty() {
        "(empty)".dimmed().to_string()
    } else {
        report.chain.join(" -> ")
    };
    println!("{} {}", "Chain:".cyan().bold(), chain);
    if let Some(seed) = report.seed {
        println!("{} {}", "Seed:".cyan().bold(), seed);
    }
    println!();

    for variant in &report.variants {
        println!("  {}", variant.text.green());
    }
}
