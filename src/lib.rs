//! dwiflow: diffusion-MRI I/O workflows.
//!
//! Three CLI-style command objects wrap the library operations:
//! [`IoInfoFlow`] inspects volumes and gradient tables, [`FetchFlow`]
//! downloads and caches named dataset bundles, and [`SplitFlow`] slices a
//! 4D volume into 3D sub-volumes.

pub mod config;
pub mod core;
pub mod data;
pub mod utils;

pub use crate::config::cli::{Cli, Command};
pub use crate::config::registry::{Bundle, BundleFile, BundleRegistry};
pub use crate::core::fetch::{cache_home, FetchArgs, FetchFlow};
pub use crate::core::io_info::{IoInfoArgs, IoInfoFlow, IoInfoSummary};
pub use crate::core::split::{SplitArgs, SplitFlow};
pub use crate::core::workflow::{FlowState, Workflow};
pub use crate::utils::error::{FlowError, Result};
