//! Attrs command - Obfuscate a requested attribute list

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use ldapmorph::middleware::AttrListMiddlewareKind;

use crate::cli::{Context, OutputFormat};

#[derive(Serialize)]
struct AttrsReport {
    original: Vec<String>,
    chain: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    variants: Vec<Vec<String>>,
}

pub fn run(ctx: &Context, names: &[String], chain: &str, count: usize) -> Result<()> {
    let chain = AttrListMiddlewareKind::parse_chain(chain)?;
    let mut engine = ctx.engine(&[], &chain);
    tracing::debug!("Obfuscating {:?} with chain {:?}", names, engine.attr_chain());

    let variants = (0..count.max(1))
        .map(|_| engine.obfuscate_attributes(names))
        .collect();

    let report = AttrsReport {
        original: names.to_vec(),
        chain: engine.attr_chain(),
        seed: ctx.seed,
        variants,
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

/// Quote names so trailing spaces stay visible
fn render(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("{:?}", n)).collect();
    format!("[{}]", quoted.join(", "))
}

fn print_text(report: &AttrsReport) {
    println!("{} {}", "Original:".cyan().bold(), render(&report.original));
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
        println!("  {}", render(variant).green());
    }
}
