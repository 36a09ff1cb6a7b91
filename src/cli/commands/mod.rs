//! Command implementations

pub mod attrs;
pub mod filter;
pub mod middlewares;
pub mod options;

use std::io::Read;

use anyhow::{Context, Result};

/// Inline argument, `-` for stdin, or a path to a file holding the input
pub(crate) fn read_input(input: &str) -> Result<(String, String)> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(("<stdin>".to_string(), buf));
    }

    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(("<argument>".to_string(), input.to_string()));
    }

    let path = std::path::Path::new(input);
    if !path.exists() {
        return Err(ldapmorph::LdapMorphError::FileNotFound {
            path: input.to_string(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok((path.display().to_string(), content))
}
