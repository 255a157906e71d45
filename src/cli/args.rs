//! CLI argument definitions using clap

use std::ffi::OsString;

use clap::Parser;

/// Transparent adb proxy: picks the target device interactively when several are attached
///
/// Every argument is forwarded to adb verbatim, so the proxy must not claim
/// any flag for itself. Help and version flags are disabled for that reason;
/// `adbx --help` shows adb's help, not ours.
#[derive(Parser, Debug)]
#[command(name = "adbx")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Arguments forwarded verbatim to adb
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ADB_ARGS")]
    pub args: Vec<OsString>,
}
