//! Invocation routing and adb dispatch
//!
//! The whole flow is linear: classify, then either forward directly or
//! discover devices, possibly ask the user to pick one, and dispatch.

use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::devices::{selection_items, DeviceResolver};
use crate::exitcode;
use crate::infrastructure::traits::{CommandRunner, PickerSelector, RealCommandRunner, Selector};
use crate::invocation::{classify, Route};

pub const DEFAULT_ADB: &str = "adb";
pub const DEFAULT_PICKER: &str = "peco";

/// Override for the adb binary.
pub const ADB_ENV: &str = "ADBX_ADB";
/// Override for the fuzzy-picker binary.
pub const PICKER_ENV: &str = "ADBX_PICKER";

/// Routes one invocation to adb, resolving the target device when needed.
pub struct ProxyService {
    adb: String,
    runner: Arc<dyn CommandRunner>,
    selector: Arc<dyn Selector>,
}

impl ProxyService {
    /// Wire up the real subprocess implementations, honoring env overrides.
    pub fn from_env() -> Self {
        let adb = env::var(ADB_ENV).unwrap_or_else(|_| DEFAULT_ADB.to_string());
        let picker = env::var(PICKER_ENV).unwrap_or_else(|_| DEFAULT_PICKER.to_string());
        let runner: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let selector = Arc::new(PickerSelector::new(picker, Arc::clone(&runner)));
        Self::with_deps(adb, runner, selector)
    }

    /// Create a proxy with custom dependencies (for testing).
    pub fn with_deps(
        adb: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        Self {
            adb: adb.into(),
            runner,
            selector,
        }
    }

    /// Route one invocation and return the process exit code.
    #[instrument(skip(self))]
    pub fn run(&self, args: &[OsString]) -> CliResult<i32> {
        if classify(args) == Route::Forward {
            debug!("forwarding unchanged");
            return self.dispatch(args);
        }

        let devices = DeviceResolver::new(&self.adb, Arc::clone(&self.runner)).resolve();
        debug!("resolved {} device(s)", devices.len());

        match devices.len() {
            0 => {
                output::info("no device may be connected");
                Ok(exitcode::UNAVAILABLE)
            }
            // A single device needs no explicit serial; adb targets it on its own.
            1 => self.dispatch(args),
            _ => {
                let items = selection_items(&devices);
                let lines: Vec<String> = items.iter().map(|i| i.display.clone()).collect();
                let picked = self
                    .selector
                    .select_one(&lines)
                    .map_err(|e| CliError::spawn("picker", e))?;
                let Some(picked) = picked else {
                    debug!("selection cancelled");
                    return Ok(exitcode::CANCELLED);
                };
                let serial = items
                    .iter()
                    .find(|i| i.display == picked)
                    .map(|i| i.value.clone())
                    .ok_or(CliError::UnknownDevice(picked))?;

                let mut full: Vec<OsString> = Vec::with_capacity(args.len() + 2);
                full.push(OsString::from("-s"));
                full.push(OsString::from(serial));
                full.extend(args.iter().cloned());
                self.dispatch(&full)
            }
        }
    }

    /// Hand the argument list to adb with inherited standard streams.
    /// The child's exit code becomes ours.
    fn dispatch(&self, args: &[OsString]) -> CliResult<i32> {
        debug!("dispatch: {} {:?}", self.adb, args);
        self.runner
            .run_interactive(&self.adb, args)
            .map_err(|e| CliError::spawn(&self.adb, e))
    }
}
