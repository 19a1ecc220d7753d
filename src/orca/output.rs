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

//! Collect Cartesian coordinate blocks from ORCA output into an XYZ trajectory.
//!
//! A block starts after a line containing [`COORDINATE_HEADER`] and any dashed
//! separator lines. Rows of `symbol x y z` follow until a blank line, another
//! coordinate header, a row with fewer than four fields, or a coordinate that
//! is not a finite number.

use crate::auxiliary::{open_compressed, read_to_string_lossy};
use crate::{Atom, Error, Result, Structure};
use derive_builder::Builder;
use derive_getters::Getters;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Header preceding each geometry in angstrom
pub const COORDINATE_HEADER: &str = "CARTESIAN COORDINATES (ANGSTROEM)";

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-{2,}").expect("valid separator pattern"));

/// Parse one coordinate row, or `None` if the row ends the block
fn parse_row(line: &str) -> Option<Atom> {
    let line = line.trim();
    if line.is_empty() || line.contains("CARTESIAN COORDINATES") {
        return None;
    }
    let mut parts = line.split_whitespace();
    let symbol = parts.next()?;
    let mut coord = || {
        parts
            .next()?
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    };
    let (x, y, z) = (coord()?, coord()?, coord()?);
    Some(Atom::new(symbol, [x, y, z]))
}

/// All non-empty coordinate blocks, in order of appearance.
///
/// Frames carry the comment `Step=<n>` counting from one.
pub fn parse_coordinate_blocks(text: &str) -> Vec<Structure> {
    let mut frames = Vec::new();
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        if !line.contains(COORDINATE_HEADER) {
            continue;
        }
        while lines.next_if(|l| SEPARATOR.is_match(l)).is_some() {}
        let mut atoms = Vec::new();
        while let Some(atom) = lines.peek().and_then(|l| parse_row(l)) {
            atoms.push(atom);
            lines.next();
        }
        if atoms.is_empty() {
            log::debug!("Skipping empty coordinate block");
            continue;
        }
        let step = frames.len() + 1;
        frames.push(Structure::new(atoms).with_comment(format!("Step={step}")));
    }
    frames
}

/// Fixed-point with eight decimals and a blank in place of a plus sign
fn signed_blank(value: f64) -> String {
    if value.is_sign_negative() {
        format!("{value:.8}")
    } else {
        format!(" {value:.8}")
    }
}

/// Write frames as a multi-frame XYZ trajectory
pub fn write_steps(writer: &mut impl Write, frames: &[Structure]) -> std::io::Result<()> {
    for frame in frames {
        writeln!(writer, "{}", frame.len())?;
        writeln!(writer, "{}", frame.comment().unwrap_or(""))?;
        for atom in frame.atoms() {
            let pos = atom.pos();
            writeln!(
                writer,
                "{:<2} {} {} {}",
                atom.symbol(),
                signed_blank(pos.x),
                signed_blank(pos.y),
                signed_blank(pos.z)
            )?;
        }
    }
    Ok(())
}

/// Settings for converting an ORCA output into a trajectory
#[derive(Debug, Clone, Builder, Getters, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertConfig {
    /// ORCA output file
    #[builder(setter(into))]
    input: PathBuf,
    /// Trajectory to create (`.gz` for compressed output)
    #[builder(setter(into))]
    output: PathBuf,
}

/// Convert all coordinate blocks of `config.input`; returns the number of frames written.
///
/// Nothing is written if no block is found.
pub fn convert(config: &ConvertConfig) -> Result<usize> {
    let text = read_to_string_lossy(&config.input)?;
    let frames = parse_coordinate_blocks(&text);
    if frames.is_empty() {
        return Err(Error::NoDataFound {
            what: "coordinate blocks",
            file: config.input.clone(),
        });
    }
    let mut stream = open_compressed(&config.output)?;
    write_steps(&mut stream, &frames)?;
    stream.finish()?;
    log::info!(
        "Wrote {} frame(s) to {}",
        frames.len(),
        config.output.display()
    );
    Ok(frames.len())
}
