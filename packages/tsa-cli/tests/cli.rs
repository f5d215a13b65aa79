//! End-to-end checks of the binaries' exit codes and basic output, run as
//! child processes via `CARGO_BIN_EXE_*` rather than a process-assertion
//! crate — the checks here are small enough that `std::process::Command`
//! plus a manual status/stdout check reads just as clearly.

use std::process::Command;

fn run_gain(args: &[&str], stdin: Option<&str>) -> std::process::Output {
    use std::io::Write;
    let mut child = Command::new(env!("CARGO_BIN_EXE_gain"))
        .args(args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("failed to launch gain");
    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
    } else {
        drop(child.stdin.take());
    }
    child.wait_with_output().expect("child process failed")
}

const CANONICAL: &str = "20240101 AAPL 1.0\n20240102 AAPL 1.1\n20240103 AAPL 1.05\n";

#[test]
fn gain_closed_form_from_statistics_exits_zero() {
    let output = run_gain(&["-a", "0.04", "-r", "0.2"], None);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: f64 = stdout.trim().parse().expect("numeric gain output");
    assert!((value - 1.01986).abs() < 1e-4);
}

#[test]
fn gain_rejects_conflicting_avg_and_p() {
    let output = run_gain(&["-a", "0.04", "-P", "0.5", "-r", "0.2"], None);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn gain_streams_from_stdin() {
    let output = run_gain(&["-p"], Some(CANONICAL));
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn gain_reports_open_error_for_missing_file() {
    let output = run_gain(&["/nonexistent/path.csv"], None);
    assert_eq!(output.status.code(), Some(2));
}
