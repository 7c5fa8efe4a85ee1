//! `FetchFlow`: download and cache named dataset bundles.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;

use crate::config::registry::{Bundle, BundleRegistry};
use crate::core::workflow::{FlowState, Workflow};
use crate::data::download::{download_file, extract_zip, verify_sha256};
use crate::utils::error::{FlowError, Result};

/// Environment variable overriding the cache home directory.
pub const HOME_ENV_VAR: &str = "DWIFLOW_HOME";

/// Where fetched bundles live by default: `$DWIFLOW_HOME`, else `~/.dwiflow`.
pub fn cache_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV_VAR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let base = directories::BaseDirs::new().ok_or_else(|| FlowError::Config {
        message: "unable to determine the home directory".to_string(),
    })?;
    Ok(base.home_dir().join(".dwiflow"))
}

#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub bundles: Vec<String>,
    pub out_dir: Option<PathBuf>,
}

pub struct FetchFlow {
    pub state: FlowState,
    registry: BundleRegistry,
    client: Client,
}

impl Default for FetchFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchFlow {
    pub fn new() -> Self {
        Self::with_registry(BundleRegistry::builtin())
    }

    pub fn with_registry(registry: BundleRegistry) -> Self {
        Self {
            state: FlowState::default(),
            registry,
            client: Client::new(),
        }
    }

    async fn fetch_bundle(&self, name: &str, bundle: &Bundle, dest: &Path) -> Result<()> {
        fs::create_dir_all(dest)?;

        for file in &bundle.files {
            let target = dest.join(&file.name);
            tracing::info!("Downloading {} to {}", file.url, target.display());
            download_file(&self.client, &file.url, &target).await?;

            if let Some(expected) = &file.sha256 {
                verify_sha256(&target, expected)?;
                tracing::debug!("Checksum verified for {}", target.display());
            }
            if file.unpack {
                extract_zip(&target, dest)?;
            }
        }

        tracing::info!("Dataset {} fetched into {}", name, dest.display());
        Ok(())
    }
}

fn bundle_in_place(bundle: &Bundle, dest: &Path) -> bool {
    dest.is_dir() && bundle.files.iter().all(|f| dest.join(&f.name).exists())
}

#[async_trait]
impl Workflow for FetchFlow {
    type Args = FetchArgs;

    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&mut self, args: &Self::Args) -> Result<()> {
        self.state.clear();

        let root = match &args.out_dir {
            Some(dir) => dir.clone(),
            None => cache_home()?,
        };

        for name in &args.bundles {
            let bundle = self.registry.get(name)?.clone();
            let dest = root.join(name);

            if bundle_in_place(&bundle, &dest) && !self.state.force_overwrite {
                tracing::info!("Dataset {} is already in place, skipping download", name);
            } else {
                self.fetch_bundle(name, &bundle, &dest).await?;
            }

            self.state.record(name.clone(), dest);
        }

        Ok(())
    }

    fn last_generated_outputs(&self) -> &HashMap<String, PathBuf> {
        self.state.outputs()
    }
}
