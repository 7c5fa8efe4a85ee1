//! Named dataset bundles and where to fetch them from.
//!
//! A registry maps bundle names to lists of downloadable files. The builtin
//! registry covers the published bundles; a TOML file with the same shape
//! can replace it at runtime:
//!
//! ```toml
//! [bundles.my_bundle]
//! description = "Local test bundle"
//!
//! [[bundles.my_bundle.files]]
//! name = "data.zip"
//! url = "https://example.com/data.zip"
//! sha256 = "..."   # optional
//! unpack = true    # extract after download
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{FlowError, Result};
use crate::utils::validation::validate_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleRegistry {
    pub bundles: HashMap<String, Bundle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub description: Option<String>,
    pub files: Vec<BundleFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFile {
    pub name: String,
    pub url: String,
    pub sha256: Option<String>,
    #[serde(default)]
    pub unpack: bool,
}

impl BundleRegistry {
    /// The bundles shipped with the crate.
    pub fn builtin() -> Self {
        let mut bundles = HashMap::new();

        bundles.insert(
            "bundle_fa_hcp".to_string(),
            Bundle {
                description: Some(
                    "FA maps of 30 white-matter bundles from HCP subjects".to_string(),
                ),
                files: vec![BundleFile {
                    name: "bundle_fa_hcp.zip".to_string(),
                    url: "https://ndownloader.figshare.com/files/14183108".to_string(),
                    sha256: None,
                    unpack: true,
                }],
            },
        );

        bundles.insert(
            "bundle_atlas_hcp842".to_string(),
            Bundle {
                description: Some("Streamline bundle atlas from 842 HCP subjects".to_string()),
                files: vec![BundleFile {
                    name: "atlas_80_bundles.zip".to_string(),
                    url: "https://ndownloader.figshare.com/files/13638644".to_string(),
                    sha256: None,
                    unpack: true,
                }],
            },
        );

        Self { bundles }
    }

    /// Loads a registry from a TOML file and validates its URLs.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let registry: Self = toml::from_str(&text)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Result<&Bundle> {
        self.bundles.get(name).ok_or_else(|| FlowError::UnknownBundle {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bundles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn validate(&self) -> Result<()> {
        for (name, bundle) in &self.bundles {
            if bundle.files.is_empty() {
                return Err(FlowError::Config {
                    message: format!("bundle '{}' lists no files", name),
                });
            }
            for file in &bundle.files {
                validate_url(&format!("bundles.{}.files.url", name), &file.url)?;
            }
        }
        Ok(())
    }
}
