// Copyright 2023-2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Tests running the `xyzkit` binary.

mod common;

use common::{run_xyzkit, write_file, COMPLEX_XYZ, TRAJECTORY_XYZ};

const ORCA_OUTPUT: &str = "\
---------------------------------
CARTESIAN COORDINATES (ANGSTROEM)
---------------------------------
  O      0.000000    0.000000    0.117790
  H      0.000000    0.755453   -0.471161
  H      0.000000   -0.755453   -0.471161

---------------------------------
CARTESIAN COORDINATES (ANGSTROEM)
---------------------------------
  O      0.000000    0.000000    0.120000
  H      0.000000    0.760000   -0.470000
  H      0.000000   -0.760000   -0.470000

";

#[test]
fn convert_orca_output() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "opt.out", ORCA_OUTPUT);
    let output = run_xyzkit(dir.path(), ["convert", "opt.out", "traj.xyz"]);
    assert!(output.status.success());
    let frames = xyzkit::io::read_trajectory(dir.path().join("traj.xyz")).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].comment(), Some("Step=1"));
    assert!(float_cmp::approx_eq!(
        f64,
        frames[1].atoms()[2].pos().y,
        -0.76,
        epsilon = 1e-9
    ));
}

#[test]
fn convert_without_blocks_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "empty.out", "SCF converged\n");
    let output = run_xyzkit(dir.path(), ["convert", "empty.out", "traj.xyz"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!dir.path().join("traj.xyz").exists());
}

#[test]
fn missing_input_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_xyzkit(dir.path(), ["split", "nothing.xyz"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn extract_frames() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "traj.xyz", TRAJECTORY_XYZ);
    let output = run_xyzkit(
        dir.path(),
        ["extract", "-i", "traj.xyz", "-o", "out", "-f", "1,3", "--prefix", "snap"],
    );
    assert!(output.status.success());
    assert!(dir.path().join("out/snap_001.xyz").exists());
    assert!(dir.path().join("out/snap_003.xyz").exists());
    assert!(!dir.path().join("out/snap_002.xyz").exists());
}

#[test]
fn split_complex() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "complex.xyz", COMPLEX_XYZ);
    let output = run_xyzkit(
        dir.path(),
        [
            "split",
            "complex.xyz",
            "--target-charge",
            "-2",
            "--remainder-dims",
            "160,160,160",
            "--chelpg",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ump.xyz (n=4)"));
    assert!(stdout.contains("surface.xyz (n=3)"));
    let ump = std::fs::read_to_string(dir.path().join("ump_esp.inp")).unwrap();
    assert!(ump.contains("CHELPG\n* xyzfile -2 1 ump.xyz\n"));
    let surface = std::fs::read_to_string(dir.path().join("surface_esp.inp")).unwrap();
    assert!(surface.contains("  Dim3 160\n"));
}

#[test]
fn run_job_file_with_report() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "opt.out", ORCA_OUTPUT);
    write_file(
        dir.path(),
        "jobs.yaml",
        "jobs:\n  - !convert { input: opt.out, output: opt.xyz.gz }\n  - !extract { input: opt.xyz.gz, frames: [2] }\n",
    );
    let output = run_xyzkit(dir.path(), ["-r", "report.yaml", "run", "-i", "jobs.yaml"]);
    assert!(output.status.success());
    assert!(dir.path().join("frames/frame_002.xyz").exists());
    let report: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(dir.path().join("report.yaml")).unwrap())
            .unwrap();
    assert_eq!(report["jobs"].as_sequence().map(Vec::len), Some(2));
}

#[test]
fn finished_jobs_are_printed_before_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "traj.xyz", TRAJECTORY_XYZ);
    write_file(
        dir.path(),
        "jobs.yaml",
        "jobs:\n  - !extract { input: traj.xyz }\n  - !convert { input: missing.out, output: opt.xyz }\n",
    );
    let output = run_xyzkit(dir.path(), ["run", "-i", "jobs.yaml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Extracted 3 of 3 frame(s)"));
    assert!(dir.path().join("frames/frame_003.xyz").exists());
}
