pub mod cli;
pub mod registry;

pub use cli::{Cli, Command};
pub use registry::{Bundle, BundleFile, BundleRegistry};
