//! Device discovery and concurrent model-name resolution
//!
//! Serials come from `adb devices`; each serial is then queried in parallel
//! for its `ro.product.model` property to get a human-readable name. A device
//! that fails the query contributes nothing, so a flaky device never blocks
//! resolution of the others.

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::debug;

use crate::infrastructure::traits::{CommandRunner, SelectionItem};

const DEVICE_LIST_HEADER: &str = "List of devices attached";
const DAEMON_BANNER_PREFIX: &str = "* daemon";
const MODEL_PROPERTY_KEY: &str = "ro.product.model=";
const BUILD_PROP_PATH: &str = "/system/build.prop";

/// One attached device with a resolved display name.
///
/// Devices are kept as (name, serial) pairs rather than a name-keyed map:
/// two devices reporting the same model name stay distinct and get
/// disambiguated in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub name: String,
}

/// Resolves attached devices to named entries via adb subprocess calls.
pub struct DeviceResolver {
    adb: String,
    runner: Arc<dyn CommandRunner>,
}

impl DeviceResolver {
    pub fn new(adb: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            adb: adb.into(),
            runner,
        }
    }

    /// Discover attached serials and resolve their model names in parallel.
    ///
    /// One task per serial, each a single blocking captured adb call; results
    /// are merged in listing order after all tasks have finished. A listing
    /// failure degrades to "no devices".
    pub fn resolve(&self) -> Vec<Device> {
        let serials = match self.list_serials() {
            Ok(serials) => serials,
            Err(e) => {
                debug!("device listing failed: {e}");
                return Vec::new();
            }
        };
        debug!("discovered {} serial(s)", serials.len());

        let resolved: Vec<Option<Device>> = serials
            .par_iter()
            .map(|serial| {
                self.query_name(serial).map(|name| Device {
                    serial: serial.clone(),
                    name,
                })
            })
            .collect();

        resolved.into_iter().flatten().collect()
    }

    /// Get device serials from `adb devices`.
    fn list_serials(&self) -> io::Result<Vec<String>> {
        let output = self.runner.run(&self.adb, &[OsString::from("devices")])?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{} devices exited with {}",
                self.adb, output.status
            )));
        }
        Ok(parse_device_list(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Read the model name of one device, or None if anything fails.
    fn query_name(&self, serial: &str) -> Option<String> {
        let args: Vec<OsString> = ["-s", serial, "shell", "cat", BUILD_PROP_PATH]
            .iter()
            .map(OsString::from)
            .collect();
        let output = match self.runner.run(&self.adb, &args) {
            Ok(output) => output,
            Err(e) => {
                debug!("property query failed for {serial}: {e}");
                return None;
            }
        };
        if !output.status.success() {
            debug!("property query for {serial} exited with {}", output.status);
            return None;
        }
        extract_model_name(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `adb devices` output into serials, preserving order.
///
/// Skips blank lines, the header line and daemon-startup banners; the serial
/// is whatever precedes the first tab.
pub fn parse_device_list(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| {
            !line.is_empty() && *line != DEVICE_LIST_HEADER && !line.starts_with(DAEMON_BANNER_PREFIX)
        })
        .map(|line| line.split('\t').next().unwrap_or(line).to_string())
        .collect()
}

/// Scan build.prop content for the model property and return its trimmed value.
pub fn extract_model_name(raw: &str) -> Option<String> {
    raw.lines()
        .find_map(|line| line.strip_prefix(MODEL_PROPERTY_KEY))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build picker entries, suffixing the serial when model names collide.
pub fn selection_items(devices: &[Device]) -> Vec<SelectionItem> {
    let name_counts = devices.iter().counts_by(|d| d.name.clone());
    devices
        .iter()
        .map(|d| {
            let ambiguous = name_counts.get(&d.name).copied().unwrap_or(0) > 1;
            let display = if ambiguous {
                format!("{} ({})", d.name, d.serial)
            } else {
                d.name.clone()
            };
            SelectionItem {
                display,
                value: d.serial.clone(),
            }
        })
        .collect()
}
