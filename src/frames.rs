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

//! Split a concatenated XYZ trajectory into one file per frame.
//!
//! Frames are copied verbatim. Scanning stops at the first line that is not an
//! atom count, or at a trailing frame with fewer lines than announced; both mark
//! the end of the data rather than an error.

use crate::auxiliary::read_to_string_lossy;
use crate::{Error, Result};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Settings for frame extraction
#[derive(Debug, Clone, Builder, Getters, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Multi-frame XYZ trajectory
    input: PathBuf,
    /// Directory receiving one file per frame; created if missing
    #[serde(default = "default_output_dir")]
    #[builder(default = "default_output_dir()")]
    output_dir: PathBuf,
    /// 1-based frame numbers to keep; all frames if `None` or empty
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    frames: Option<BTreeSet<usize>>,
    /// File name prefix; frame 4 becomes `<prefix>_004.xyz`
    #[serde(default = "default_prefix")]
    #[builder(default = "default_prefix()", setter(into))]
    #[validate(length(min = 1))]
    prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("frames")
}

fn default_prefix() -> String {
    "frame".to_string()
}

impl ExtractConfig {
    fn is_selected(&self, frame_number: usize) -> bool {
        self.frames
            .as_ref()
            .map_or(true, |frames| frames.is_empty() || frames.contains(&frame_number))
    }

    /// Output path of a frame
    pub fn frame_path(&self, frame_number: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:03}.xyz", self.prefix, frame_number))
    }
}

/// Outcome of a frame extraction
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize)]
pub struct ExtractSummary {
    /// Number of complete frames found in the input
    frames_scanned: usize,
    /// Files written, in frame order
    written: Vec<PathBuf>,
}

/// One frame as a run of raw lines, endings included
#[derive(Debug, PartialEq)]
pub(crate) struct RawFrame<'a> {
    pub number: usize,
    pub lines: &'a [&'a str],
}

/// Split text into complete frames, stopping quietly at the end of usable data
pub(crate) fn scan_frames<'a>(lines: &'a [&'a str]) -> Vec<RawFrame<'a>> {
    let mut frames = Vec::new();
    let mut start = 0;
    while start < lines.len() {
        let Ok(num_atoms) = lines[start].trim().parse::<usize>() else {
            log::debug!(
                "Line {} is not an atom count; end of trajectory",
                start + 1
            );
            break;
        };
        let end = start
            .checked_add(num_atoms)
            .and_then(|n| n.checked_add(2))
            .filter(|&end| end <= lines.len());
        let Some(end) = end else {
            log::warn!(
                "Ignoring incomplete frame {} starting at line {}",
                frames.len() + 1,
                start + 1
            );
            break;
        };
        frames.push(RawFrame {
            number: frames.len() + 1,
            lines: &lines[start..end],
        });
        start = end;
    }
    frames
}

/// Write the selected frames of `config.input` into `config.output_dir`
pub fn extract_frames(config: &ExtractConfig) -> Result<ExtractSummary> {
    config.validate()?;
    let text = read_to_string_lossy(&config.input)?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let frames = scan_frames(&lines);
    if frames.is_empty() {
        return Err(Error::NoDataFound {
            what: "frames",
            file: config.input.clone(),
        });
    }
    log::info!("Scanned {} frame(s) in {}", frames.len(), config.input.display());

    if let Some(missing) = config
        .frames
        .as_ref()
        .map(|selection| selection.range(frames.len() + 1..).collect::<Vec<_>>())
        .filter(|missing| !missing.is_empty())
    {
        log::warn!(
            "Requested frame(s) {:?} not present; trajectory has {} frame(s)",
            missing,
            frames.len()
        );
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let mut written = Vec::new();
    for frame in frames.iter().filter(|f| config.is_selected(f.number)) {
        let path = config.frame_path(frame.number);
        write_raw_frame(&path, frame)?;
        log::debug!("Wrote frame {} to {}", frame.number, path.display());
        written.push(path);
    }
    Ok(ExtractSummary {
        frames_scanned: frames.len(),
        written,
    })
}

fn write_raw_frame(path: &Path, frame: &RawFrame) -> Result<()> {
    std::fs::write(path, frame.lines.concat())?;
    Ok(())
}
