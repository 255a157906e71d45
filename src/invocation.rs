//! Classification of a raw argument list
//!
//! Decides whether an invocation needs a target device resolved before it is
//! handed to adb, or can be forwarded as-is.

use std::ffi::OsString;

/// adb flags that already pin the target device; the rest of such an
/// invocation is adb's business, not ours.
const DEVICE_SELECTOR_FLAGS: &[&str] = &["-s", "-d", "-e", "-t"];

/// adb subcommands that operate without a target device.
const SERIAL_FREE_COMMANDS: &[&str] = &["help", "devices", "version", "start-server", "kill-server"];

/// Routing decision for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward the arguments to adb unchanged.
    Forward,
    /// Resolve a target device before dispatching.
    Resolve,
}

/// Classify a raw argument list.
///
/// An empty list, an explicit device selector up front, or a serial-free
/// subcommand all forward unchanged; everything else needs resolution.
pub fn classify(args: &[OsString]) -> Route {
    let Some(first) = args.first() else {
        return Route::Forward;
    };
    let first = first.to_string_lossy();
    if DEVICE_SELECTOR_FLAGS.contains(&first.as_ref())
        || SERIAL_FREE_COMMANDS.contains(&first.as_ref())
    {
        Route::Forward
    } else {
        Route::Resolve
    }
}
