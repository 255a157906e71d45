use std::process;

use clap::Parser;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use adbx::cli::{output, Cli};
use adbx::proxy::ProxyService;

fn main() {
    let cli = Cli::parse();

    setup_logging();

    let proxy = ProxyService::from_env();
    match proxy.run(&cli.args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            output::error(&e);
            process::exit(e.exit_code());
        }
    }
}

fn setup_logging() {
    // The proxy claims no flags of its own (everything is forwarded to adb),
    // so verbosity comes from the environment instead of the command line.
    let filter = EnvFilter::try_from_env("ADBX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}
