//! Shared helpers for unit tests

use std::process::{Command, Stdio};

/// Whether an external program can be started
pub fn program_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Set to make tests fail, rather than skip, when xz or dd is missing
pub const REQUIRE_COMPRESSION_ENV: &str = "MEASLOG_REQUIRE_COMPRESSION";

/// Whether the default compression programs are installed
///
/// Tests exercising compression return early when this is false, after
/// printing a skip notice. With `MEASLOG_REQUIRE_COMPRESSION` set, missing
/// programs fail the test instead.
pub fn compression_available() -> bool {
    let installed = program_available("xz") && program_available("dd");
    check_compression(installed, std::env::var_os(REQUIRE_COMPRESSION_ENV).is_some())
}

fn check_compression(installed: bool, required: bool) -> bool {
    if installed {
        return true;
    }
    assert!(
        !required,
        "xz and dd must be installed when {REQUIRE_COMPRESSION_ENV} is set"
    );
    eprintln!("skipping compression test: xz or dd not installed");
    false
}

/// Decompress an xz file with the system tool
pub fn xz_decompress(path: &std::path::Path) -> Vec<u8> {
    let output = Command::new("xz")
        .arg("--decompress")
        .arg("--stdout")
        .arg(path)
        .output()
        .expect("failed to run xz");
    assert!(output.status.success(), "xz failed on {}", path.display());
    output.stdout
}

#[test]
fn test_check_compression_skips_when_optional() {
    assert!(check_compression(true, true));
    assert!(!check_compression(false, false));
}

#[test]
#[should_panic(expected = "must be installed")]
fn test_check_compression_fails_when_required() {
    check_compression(false, true);
}
