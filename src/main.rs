//! ldapmorph - LDAP search filter and attribute list obfuscation
//!
//! Command line front end for the obfuscation middlewares. Filters are read
//! as JSON and printed as RFC 4515 text (or JSON with --format json).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{commands, Context, OutputFormat};
use ldapmorph::errors::format_error;
use ldapmorph::LdapMorphError;

/// ldapmorph - Obfuscate LDAP search filters and attribute lists
#[derive(Parser)]
#[command(
    name = "ldapmorph",
    version,
    about = "LDAP search filter and attribute list obfuscation",
    long_about = "ldapmorph rewrites LDAP search filters and attribute lists into forms that \
                  look different on the wire but match the same entries.\n\n\
                  Techniques:\n\
                  • Hex escapes, letter case and whitespace in values\n\
                  • Leading zeros in integers and OIDs\n\
                  • Wildcard splits, extensible and approximate matches\n\
                  • Boolean wrapping, double negation and garbage branches"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Options file with an [options] table (default: ./ldapmorph.toml)
    #[arg(long, global = true, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Override an option, e.g. --set FiltCaseProb=0.5 (repeatable)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Attribute catalog with [[attribute]] tables (default: built-in AD catalog)
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obfuscate a search filter
    Filter {
        /// Filter as JSON, a path to a JSON file, or '-' for stdin
        input: String,

        /// Comma-separated filter middleware chain
        #[arg(short, long, default_value = "case,oid,zeros,hex,wildcard")]
        chain: String,

        /// Number of variants to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Obfuscate a requested attribute list
    Attrs {
        /// Attribute names
        #[arg(required = true)]
        names: Vec<String>,

        /// Comma-separated attribute list middleware chain
        #[arg(short, long, default_value = "case,oid,duplicate,reorder")]
        chain: String,

        /// Number of variants to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Show option keys with their effective values
    Options,

    /// List available middlewares
    Middlewares,
}

fn init_logging(verbosity: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbosity {
            0 => EnvFilter::new("ldapmorph=warn"),
            1 => EnvFilter::new("ldapmorph=debug"),
            2 => EnvFilter::new("ldapmorph=trace"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(
        cli.options.as_deref(),
        &cli.overrides,
        cli.catalog.as_deref(),
        cli.seed,
        cli.format,
    )?;

    match cli.command {
        Commands::Filter {
            input,
            chain,
            count,
        } => commands::filter::run(&ctx, &input, &chain, count),
        Commands::Attrs {
            names,
            chain,
            count,
        } => commands::attrs::run(&ctx, &names, &chain, count),
        Commands::Options => commands::options::run(&ctx),
        Commands::Middlewares => commands::middlewares::run(&ctx, cli.verbose > 0),
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast::<LdapMorphError>() {
            Ok(diagnostic) => eprintln!("{:?}", miette::Report::new(diagnostic)),
            Err(err) => eprintln!("Error: {}", format_error(&err)),
        }
        std::process::exit(1);
    }
}
