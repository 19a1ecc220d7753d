//! Shared utilities for integration tests.
//!
//! Fixture structures and helpers for running the `xyzkit` CLI binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Water followed by a phosphate-like group (P bonded to three oxygens)
pub const COMPLEX_XYZ: &str = "7
water and phosphate
O    0.000000  0.000000  0.000000
H    0.960000  0.000000  0.000000
H   -0.240000  0.930000  0.000000
P   10.000000  0.000000  0.000000
O   11.500000  0.000000  0.000000
O   10.000000  1.500000  0.000000
O   10.000000  0.000000  1.500000
";

/// Three frames with 2, 3 and 2 atoms
pub const TRAJECTORY_XYZ: &str = "2
first
H 0.0 0.0 0.0
H 0.0 0.0 0.74
3
second
O 0.0 0.0 0.0
H 0.96 0.0 0.0
H -0.24 0.93 0.0
2
third
N 0.0 0.0 0.0
N 0.0 0.0 1.10
";

/// Path to the compiled `xyzkit` binary.
pub fn xyzkit_binary() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_BIN_EXE_xyzkit"));
    if !path.exists() {
        path = PathBuf::from("target/debug/xyzkit");
    }
    path
}

/// Run xyzkit with the given arguments inside `dir`
pub fn run_xyzkit<I, S>(dir: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(xyzkit_binary())
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to execute xyzkit binary")
}

/// Write `content` to `name` inside `dir` and return the full path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}
