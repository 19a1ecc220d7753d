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

//! Integration tests for the xyzkit library.

mod common;

use approx::assert_abs_diff_eq;
use common::{write_file, COMPLEX_XYZ, TRAJECTORY_XYZ};
use xyzkit::{
    config::{JobFile, JobReport},
    frames::{extract_frames, ExtractConfigBuilder},
    io,
    neighbor::NeighborStrategy,
    split::{run_split, SplitConfigBuilder},
    Error,
};

#[test]
fn split_complex_into_fragments() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "complex.xyz", COMPLEX_XYZ);
    let out = dir.path().join("esp");
    let config = SplitConfigBuilder::default()
        .input(&input)
        .output_dir(&out)
        .build()
        .unwrap();
    let summary = run_split(&config).unwrap();
    assert_eq!(*summary.num_atoms(), 7);

    let ump = io::read_structure(out.join("ump.xyz")).unwrap();
    let surface = io::read_structure(out.join("surface.xyz")).unwrap();
    assert_eq!(ump.symbols().collect::<Vec<_>>(), vec!["P", "O", "O", "O"]);
    assert_eq!(surface.symbols().collect::<Vec<_>>(), vec!["O", "H", "H"]);
    assert_abs_diff_eq!(ump.atoms()[1].pos().x, 11.5, epsilon = 1e-6);
    assert_abs_diff_eq!(surface.atoms()[2].pos().y, 0.93, epsilon = 1e-6);

    let ump_input = std::fs::read_to_string(out.join("ump_esp.inp")).unwrap();
    let surface_input = std::fs::read_to_string(out.join("surface_esp.inp")).unwrap();
    assert!(ump_input.starts_with("! SP B3LYP D3BJ def2-TZVP TightSCF\n"));
    assert!(ump_input.ends_with("* xyzfile -1 1 ump.xyz\n"));
    assert!(surface_input.ends_with("* xyzfile 0 1 surface.xyz\n"));
    assert!(!ump_input.contains("CHELPG"));

    let text = summary.to_string();
    assert!(text.contains("(n=4)"));
    assert!(text.contains("(n=3)"));
    assert!(text.contains("ump -1/1, surface 0/1"));
}

#[test]
fn split_with_explicit_target() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "complex.xyz", COMPLEX_XYZ);
    let config = SplitConfigBuilder::default()
        .input(&input)
        .output_dir(dir.path())
        .target_indices(vec![2, 1])
        .neighbor_search(NeighborStrategy::AllPairs)
        .chelpg(true)
        .build()
        .unwrap();
    run_split(&config).unwrap();
    let ump = io::read_structure(dir.path().join("ump.xyz")).unwrap();
    let surface = io::read_structure(dir.path().join("surface.xyz")).unwrap();
    assert_eq!(ump.symbols().collect::<Vec<_>>(), vec!["H", "O"]);
    assert_eq!(surface.len(), 5);
    let deck = std::fs::read_to_string(dir.path().join("surface_esp.inp")).unwrap();
    assert!(deck.contains("end\n\nCHELPG\n* xyzfile"));
}

#[test]
fn split_rejects_bad_index_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "complex.xyz", COMPLEX_XYZ);
    let out = dir.path().join("esp");
    let config = SplitConfigBuilder::default()
        .input(&input)
        .output_dir(&out)
        .target_indices(vec![1, 8])
        .build()
        .unwrap();
    assert!(matches!(run_split(&config), Err(Error::InvalidIndex(_))));
    assert!(!out.exists());
}

#[test]
fn extract_selected_frames() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "traj.xyz", TRAJECTORY_XYZ);
    let out = dir.path().join("frames");
    let config = ExtractConfigBuilder::default()
        .input(input)
        .output_dir(out.clone())
        .frames([2, 3, 9].into_iter().collect())
        .build()
        .unwrap();
    let summary = extract_frames(&config).unwrap();
    assert_eq!(*summary.frames_scanned(), 3);
    assert_eq!(summary.written().len(), 2);
    let second = std::fs::read_to_string(out.join("frame_002.xyz")).unwrap();
    assert_eq!(
        second,
        "3\nsecond\nO 0.0 0.0 0.0\nH 0.96 0.0 0.0\nH -0.24 0.93 0.0\n"
    );
    assert!(out.join("frame_003.xyz").exists());
    assert!(!out.join("frame_001.xyz").exists());
}

#[test]
fn job_file_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "traj.xyz", TRAJECTORY_XYZ);
    write_file(dir.path(), "complex.xyz", COMPLEX_XYZ);
    let root = dir.path().display();
    let yaml = format!(
        "jobs:
  - !extract
    input: '{root}/traj.xyz'
    output_dir: '{root}/frames'
    frames: [1]
  - !split
    input: '{root}/complex.xyz'
    output_dir: '{root}/esp'
    target: {{ name: ligand, charge: -2 }}
    remainder: {{ name: slab, charge: 0, grid: '160,160,160' }}
"
    );
    let reports = JobFile::from_yaml(&yaml).unwrap().run().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(matches!(&reports[0], JobReport::Extract(s) if s.written().len() == 1));
    let slab = std::fs::read_to_string(dir.path().join("esp/slab_esp.inp")).unwrap();
    assert!(slab.contains("  Dim1 160\n"));
    let ligand = std::fs::read_to_string(dir.path().join("esp/ligand_esp.inp")).unwrap();
    assert!(ligand.contains("  Dim1 120\n"));
    assert!(ligand.ends_with("* xyzfile -2 1 ligand.xyz\n"));
}
