use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::utils::error::{FlowError, Result};

/// A command object wrapping one library operation, CLI-subcommand style.
///
/// Flows keep state between `run` and inspection: generated output paths
/// are recorded under stable keys and can be queried afterwards.
#[async_trait]
pub trait Workflow {
    type Args: Send + Sync;

    fn name(&self) -> &'static str;

    async fn run(&mut self, args: &Self::Args) -> Result<()>;

    /// Paths produced by the most recent `run`, keyed by output name.
    fn last_generated_outputs(&self) -> &HashMap<String, PathBuf>;
}

/// Output bookkeeping shared by the flows.
#[derive(Debug, Default)]
pub struct FlowState {
    pub force_overwrite: bool,
    outputs: HashMap<String, PathBuf>,
}

impl FlowState {
    pub fn record(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let _ = self.outputs.insert(key.into(), path.into());
    }

    pub fn outputs(&self) -> &HashMap<String, PathBuf> {
        &self.outputs
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    /// Errors when `path` already exists and force-overwrite is off.
    pub fn check_overwrite(&self, path: &Path) -> Result<()> {
        if path.exists() && !self.force_overwrite {
            return Err(FlowError::OutputExists {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}
