//! Tests for invocation routing: forwarding, serial injection, early exits

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use rstest::rstest;

use adbx::exitcode;
use adbx::infrastructure::traits::{CommandRunner, Selector};
use adbx::proxy::ProxyService;
use adbx::CliError;

#[ctor::ctor]
fn init() {
    adbx::util::testing::init_test_setup();
}

fn output(code: i32, stdout: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code << 8),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

fn to_strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn os_args(list: &[&str]) -> Vec<OsString> {
    list.iter().map(OsString::from).collect()
}

/// Mock command runner serving canned adb outputs and recording every call.
#[derive(Default)]
struct MockRunner {
    /// stdout for `adb devices`; None simulates a spawn failure
    listing: Option<String>,
    /// build.prop stdout per serial; a missing serial exits non-zero
    props: HashMap<String, String>,
    captured: Mutex<Vec<Vec<String>>>,
    dispatched: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    fn with_devices(entries: &[(&str, &str)]) -> Self {
        let rows: String = entries
            .iter()
            .map(|(serial, _)| format!("{serial}\tdevice\n"))
            .collect();
        Self {
            listing: Some(format!("List of devices attached\n{rows}")),
            props: entries
                .iter()
                .map(|(serial, model)| {
                    (
                        (*serial).to_string(),
                        format!("ro.product.model={model}\n"),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    fn captured(&self) -> Vec<Vec<String>> {
        self.captured.lock().unwrap().clone()
    }

    fn dispatched(&self) -> Vec<Vec<String>> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, _cmd: &str, args: &[OsString]) -> io::Result<Output> {
        let args = to_strings(args);
        self.captured.lock().unwrap().push(args.clone());
        if args == ["devices"] {
            return match &self.listing {
                Some(listing) => Ok(output(0, listing)),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "adb not found")),
            };
        }
        if args.len() == 5 && args[0] == "-s" && args[2] == "shell" {
            return Ok(match self.props.get(&args[1]) {
                Some(prop) => output(0, prop),
                None => output(1, ""),
            });
        }
        Ok(output(1, ""))
    }

    fn run_with_stdin(&self, _cmd: &str, _args: &[OsString], _stdin: &str) -> io::Result<Output> {
        Err(io::Error::other("no picker behind this runner"))
    }

    fn run_interactive(&self, _cmd: &str, args: &[OsString]) -> io::Result<i32> {
        self.dispatched.lock().unwrap().push(to_strings(args));
        Ok(0)
    }
}

/// Mock selector that returns a predetermined selection and records
/// the lines offered to the user.
struct MockSelector {
    pick: Option<String>,
    offered: Mutex<Vec<String>>,
}

impl MockSelector {
    fn new(pick: Option<&str>) -> Self {
        Self {
            pick: pick.map(str::to_string),
            offered: Mutex::new(Vec::new()),
        }
    }

    fn offered(&self) -> Vec<String> {
        self.offered.lock().unwrap().clone()
    }
}

impl Selector for MockSelector {
    fn select_one(&self, lines: &[String]) -> io::Result<Option<String>> {
        *self.offered.lock().unwrap() = lines.to_vec();
        Ok(self.pick.clone())
    }
}

fn proxy(
    runner: &Arc<MockRunner>,
    selector: &Arc<MockSelector>,
) -> ProxyService {
    ProxyService::with_deps(
        "adb",
        Arc::clone(runner) as Arc<dyn CommandRunner>,
        Arc::clone(selector) as Arc<dyn Selector>,
    )
}

#[rstest]
#[case::explicit_serial(&["-s", "SERIAL123", "shell"])]
#[case::local_transport(&["-d", "logcat"])]
#[case::devices(&["devices"])]
#[case::kill_server(&["kill-server"])]
#[case::empty(&[])]
fn given_passthrough_invocation_when_run_then_forwards_without_discovery(
    #[case] args: &[&str],
) {
    let runner = Arc::new(MockRunner::default());
    let selector = Arc::new(MockSelector::new(None));

    let code = proxy(&runner, &selector).run(&os_args(args)).unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(runner.dispatched(), vec![to_strings(&os_args(args))]);
    assert!(runner.captured().is_empty(), "no discovery expected");
}

#[rstest]
fn given_no_devices_when_run_then_reports_and_skips_dispatch() {
    let runner = Arc::new(MockRunner::with_devices(&[]));
    let selector = Arc::new(MockSelector::new(None));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell"]))
        .unwrap();

    assert_eq!(code, exitcode::UNAVAILABLE);
    assert!(runner.dispatched().is_empty());
}

#[rstest]
fn given_listing_failure_when_run_then_degrades_to_no_device() {
    let runner = Arc::new(MockRunner::default()); // listing: None => spawn error
    let selector = Arc::new(MockSelector::new(None));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell"]))
        .unwrap();

    assert_eq!(code, exitcode::UNAVAILABLE);
    assert!(runner.dispatched().is_empty());
}

#[rstest]
fn given_single_device_when_run_then_forwards_without_serial() {
    let runner = Arc::new(MockRunner::with_devices(&[("SERIAL123", "Pixel")]));
    let selector = Arc::new(MockSelector::new(None));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell", "ls"]))
        .unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(runner.dispatched(), vec![vec!["shell", "ls"]]);
    assert!(selector.offered().is_empty(), "no selection expected");
}

#[rstest]
fn given_two_devices_when_user_picks_then_injects_selected_serial() {
    let runner = Arc::new(MockRunner::with_devices(&[
        ("S1", "Pixel"),
        ("S2", "Nexus"),
    ]));
    let selector = Arc::new(MockSelector::new(Some("Nexus")));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell", "ls"]))
        .unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(selector.offered(), vec!["Pixel", "Nexus"]);
    assert_eq!(runner.dispatched(), vec![vec!["-s", "S2", "shell", "ls"]]);
}

#[rstest]
fn given_unknown_selection_when_run_then_errors_without_dispatch() {
    let runner = Arc::new(MockRunner::with_devices(&[
        ("S1", "Pixel"),
        ("S2", "Nexus"),
    ]));
    let selector = Arc::new(MockSelector::new(Some("Slate")));

    let err = proxy(&runner, &selector)
        .run(&os_args(&["shell"]))
        .unwrap_err();

    assert!(matches!(err, CliError::UnknownDevice(ref name) if name == "Slate"));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(runner.dispatched().is_empty());
}

#[rstest]
fn given_cancelled_picker_when_run_then_exits_without_dispatch() {
    let runner = Arc::new(MockRunner::with_devices(&[
        ("S1", "Pixel"),
        ("S2", "Nexus"),
    ]));
    let selector = Arc::new(MockSelector::new(None));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell"]))
        .unwrap();

    assert_eq!(code, exitcode::CANCELLED);
    assert!(runner.dispatched().is_empty());
}

#[rstest]
fn given_duplicate_model_names_when_user_picks_then_serial_disambiguates() {
    let runner = Arc::new(MockRunner::with_devices(&[
        ("S1", "Pixel"),
        ("S2", "Pixel"),
    ]));
    let selector = Arc::new(MockSelector::new(Some("Pixel (S2)")));

    let code = proxy(&runner, &selector)
        .run(&os_args(&["logcat"]))
        .unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(selector.offered(), vec!["Pixel (S1)", "Pixel (S2)"]);
    assert_eq!(runner.dispatched(), vec![vec!["-s", "S2", "logcat"]]);
}

#[rstest]
fn given_failing_name_query_when_run_then_device_is_skipped() {
    // Two serials attached, only S1 answers the property query.
    let mut runner = MockRunner::with_devices(&[("S1", "Pixel"), ("S2", "Nexus")]);
    runner.props.remove("S2");
    let runner = Arc::new(runner);
    let selector = Arc::new(MockSelector::new(None));

    // Only one device resolves, so the original args go through untouched.
    let code = proxy(&runner, &selector)
        .run(&os_args(&["shell"]))
        .unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(runner.dispatched(), vec![vec!["shell"]]);
}
