pub mod fetch;
pub mod io_info;
pub mod split;
pub mod workflow;

pub use fetch::{cache_home, FetchArgs, FetchFlow};
pub use io_info::{IoInfoArgs, IoInfoFlow, IoInfoSummary};
pub use split::{SplitArgs, SplitFlow};
pub use workflow::{FlowState, Workflow};
