pub mod cli;
pub mod devices;
pub mod exitcode;
pub mod infrastructure;
pub mod invocation;
pub mod proxy;
pub mod util;

pub use cli::{CliError, CliResult};
pub use proxy::ProxyService;
