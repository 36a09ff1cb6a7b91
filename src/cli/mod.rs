//! CLI module - Command implementations and shared setup

pub mod commands;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use ldapmorph::catalog::{AttributeCatalog, StaticCatalog};
use ldapmorph::middleware::{AttrListMiddlewareKind, FilterMiddlewareKind, ObfuscationEngine};
use ldapmorph::options::{default_value, Options};
use ldapmorph::LdapMorphError;

/// Output format for CLI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a command needs besides its own arguments
pub struct Context {
    pub options: Options,
    pub catalog: Arc<dyn AttributeCatalog>,
    pub seed: Option<u64>,
    pub format: OutputFormat,
}

impl Context {
    /// Load options and catalog, then apply `KEY=VALUE` overrides
    pub fn load(
        options_path: Option<&Path>,
        overrides: &[String],
        catalog_path: Option<&Path>,
        seed: Option<u64>,
        format: OutputFormat,
    ) -> Result<Self> {
        let mut options = match options_path {
            Some(path) => {
                if !path.exists() {
                    return Err(LdapMorphError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Options::load_from_path(path)
                    .map_err(|e| LdapMorphError::options(path.display().to_string(), e))?
            }
            None => Options::load_or_default(None),
        };

        for raw in overrides {
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| LdapMorphError::InvalidOverride { raw: raw.clone() })?;
            let key = key.trim();
            if default_value(key).is_none() {
                return Err(LdapMorphError::unknown_option(key).into());
            }
            options
                .set(key, value.trim())
                .with_context(|| format!("Failed to set option {}", key))?;
        }

        let catalog: Arc<dyn AttributeCatalog> = match catalog_path {
            Some(path) => {
                if !path.exists() {
                    return Err(LdapMorphError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                let catalog = StaticCatalog::load_from_path(path)
                    .map_err(|e| LdapMorphError::catalog(path.display().to_string(), e))?;
                Arc::new(catalog)
            }
            None => Arc::new(StaticCatalog::builtin()),
        };

        Ok(Self {
            options,
            catalog,
            seed,
            format,
        })
    }

    /// Engine for the given chains, seeded when `--seed` was passed
    pub fn engine(
        &self,
        filter_chain: &[FilterMiddlewareKind],
        attr_chain: &[AttrListMiddlewareKind],
    ) -> ObfuscationEngine {
        let engine = ObfuscationEngine::from_kinds(
            filter_chain,
            attr_chain,
            &self.options,
            self.catalog.clone(),
        );
        match self.seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        }
    }
}
