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

//! Batches of jobs described in YAML.
//!
//! Each job is a tagged mapping (`!extract`, `!convert` or `!split`) holding
//! the same settings as the corresponding command line tool.
//!
//! # Examples
//! ~~~
//! use xyzkit::config::{Job, JobFile};
//!
//! let yaml = r#"
//! jobs:
//!   - !convert { input: opt.out, output: opt.xyz }
//!   - !extract { input: opt.xyz, output_dir: frames, frames: [4, 8, 11, 14] }
//!   - !split { input: frames/frame_004.xyz, output_dir: esp, chelpg: true }
//! "#;
//! let jobs = JobFile::from_yaml(yaml).unwrap();
//! assert_eq!(jobs.jobs.len(), 3);
//! assert!(matches!(jobs.jobs[2], Job::Split(_)));
//! ~~~

use crate::frames::{extract_frames, ExtractConfig, ExtractSummary};
use crate::orca::output::{convert, ConvertConfig};
use crate::split::{run_split, SplitConfig, SplitSummary};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    /// Write selected trajectory frames to separate files
    Extract(ExtractConfig),
    /// Collect coordinate blocks of an ORCA output into a trajectory
    Convert(ConvertConfig),
    /// Split a complex into two fragments with ORCA inputs
    Split(SplitConfig),
}

/// Result of a finished job
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobReport {
    Extract(ExtractSummary),
    Convert { frames: usize },
    Split(SplitSummary),
}

impl Job {
    /// Short name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Extract(_) => "extract",
            Self::Convert(_) => "convert",
            Self::Split(_) => "split",
        }
    }

    pub fn run(&self) -> Result<JobReport> {
        match self {
            Self::Extract(config) => extract_frames(config).map(JobReport::Extract),
            Self::Convert(config) => convert(config).map(|frames| JobReport::Convert { frames }),
            Self::Split(config) => run_split(config).map(JobReport::Split),
        }
    }
}

/// Ordered list of jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Run all jobs in order, stopping at the first failure
    pub fn run(&self) -> Result<Vec<JobReport>> {
        self.run_with(|_| {})
    }

    /// Like [`JobFile::run`] but hands each report to `on_report` as soon as its job finishes,
    /// so that completed work is reported even if a later job fails.
    pub fn run_with(&self, mut on_report: impl FnMut(&JobReport)) -> Result<Vec<JobReport>> {
        let mut reports = Vec::with_capacity(self.jobs.len());
        for (i, job) in self.jobs.iter().enumerate() {
            log::info!("Job {}/{}: {}", i + 1, self.jobs.len(), job.name());
            match job.run() {
                Ok(report) => {
                    on_report(&report);
                    reports.push(report);
                }
                Err(err) => {
                    log::error!(
                        "Job {}/{} ({}) failed; {} job(s) completed",
                        i + 1,
                        self.jobs.len(),
                        job.name(),
                        reports.len()
                    );
                    return Err(err);
                }
            }
        }
        Ok(reports)
    }
}
