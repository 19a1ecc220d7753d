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

//! Split a complex into a target fragment and the remainder, and prepare
//! ORCA electrostatic potential calculations for both.
//!
//! For each fragment `<name>.xyz` and `<name>_esp.inp` are written to the
//! output directory. Everything is prepared in memory first so that a failed
//! partitioning leaves no files behind.

use crate::neighbor::NeighborStrategy;
use crate::orca::{GridDims, OrcaInput};
use crate::partition::{Partition, PartitionerBuilder, Selection};
use crate::{io, Error, Result, Structure};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

/// Output names and electronic state of one fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FragmentSettings {
    /// Base name of the fragment files
    #[validate(length(min = 1))]
    pub name: String,
    /// Net charge
    #[serde(default)]
    pub charge: i32,
    /// Spin multiplicity
    #[serde(default = "default_multiplicity")]
    #[validate(range(min = 1))]
    pub multiplicity: u32,
    /// Cube grid replacing the shared one
    #[serde(default)]
    pub grid: Option<GridDims>,
}

impl FragmentSettings {
    pub fn new(name: impl Into<String>, charge: i32, multiplicity: u32) -> Self {
        Self {
            name: name.into(),
            charge,
            multiplicity,
            grid: None,
        }
    }

    /// Anionic nucleotide fragment
    fn default_target() -> Self {
        Self::new("ump", -1, 1)
    }

    /// Neutral surface fragment
    fn default_remainder() -> Self {
        Self::new("surface", 0, 1)
    }

    pub fn structure_file(&self) -> String {
        format!("{}.xyz", self.name)
    }

    pub fn input_file(&self) -> String {
        format!("{}_esp.inp", self.name)
    }
}

fn default_multiplicity() -> u32 {
    1
}

/// Settings for a split job
#[derive(Debug, Clone, Builder, Getters, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_split"))]
pub struct SplitConfig {
    /// Structure of the complex
    #[builder(setter(into))]
    input: PathBuf,
    /// Directory receiving the fragment files
    #[serde(default = "defaults::output_dir")]
    #[builder(default = "defaults::output_dir()", setter(into))]
    output_dir: PathBuf,
    /// 1-based atom numbers of the target; skips the connectivity analysis
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    target_indices: Option<Vec<usize>>,
    /// Scaling of covalent radii
    #[serde(default = "defaults::cutoff_mult")]
    #[builder(default = "defaults::cutoff_mult()")]
    #[validate(range(exclusive_min = 0.0))]
    cutoff_mult: f64,
    /// Extra pair distance (Å)
    #[serde(default)]
    #[builder(default)]
    #[validate(range(min = 0.0))]
    skin: f64,
    /// Element identifying the target component
    #[serde(default = "defaults::marker")]
    #[builder(default = "defaults::marker()")]
    marker: Option<String>,
    #[serde(default)]
    #[builder(default)]
    neighbor_search: NeighborStrategy,
    #[serde(default = "FragmentSettings::default_target")]
    #[builder(default = "FragmentSettings::default_target()")]
    #[validate(nested)]
    target: FragmentSettings,
    #[serde(default = "FragmentSettings::default_remainder")]
    #[builder(default = "FragmentSettings::default_remainder()")]
    #[validate(nested)]
    remainder: FragmentSettings,
    /// Number of MPI processes
    #[serde(default = "defaults::nprocs")]
    #[builder(default = "defaults::nprocs()")]
    #[validate(range(min = 1))]
    nprocs: u32,
    /// Memory per core (MB)
    #[serde(default = "defaults::maxcore")]
    #[builder(default = "defaults::maxcore()")]
    #[validate(range(min = 1))]
    maxcore: u32,
    /// Method and basis set
    #[serde(default = "defaults::method")]
    #[builder(default = "defaults::method()", setter(into))]
    #[validate(length(min = 1))]
    method: String,
    /// Cube grid for both fragments unless overridden
    #[serde(default)]
    #[builder(default)]
    grid: GridDims,
    /// Fit CHELPG charges to the ESP
    #[serde(default)]
    #[builder(default)]
    chelpg: bool,
}

mod defaults {
    use std::path::PathBuf;

    pub fn output_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn cutoff_mult() -> f64 {
        1.0
    }
    pub fn marker() -> Option<String> {
        Some("P".to_string())
    }
    pub fn nprocs() -> u32 {
        8
    }
    pub fn maxcore() -> u32 {
        2000
    }
    pub fn method() -> String {
        "B3LYP D3BJ def2-TZVP".to_string()
    }
}

fn validate_split(config: &SplitConfig) -> core::result::Result<(), ValidationError> {
    if config.target.name == config.remainder.name {
        return Err(ValidationError::new("fragment names must differ"));
    }
    Ok(())
}

/// Parse comma separated 1-based atom numbers such as `"1,2, 5"`.
///
/// Blank input means no override and gives `None`.
pub fn parse_index_list(text: &str) -> Result<Option<Vec<usize>>> {
    let numbers = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| Error::InvalidIndex(format!("'{s}' is not an atom number")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(numbers).filter(|n| !n.is_empty()))
}

/// Files and electronic state written for one fragment
#[derive(Debug, Clone, PartialEq, Getters, Serialize)]
pub struct FragmentSummary {
    name: String,
    num_atoms: usize,
    charge: i32,
    multiplicity: u32,
    structure_file: PathBuf,
    input_file: PathBuf,
}

/// Outcome of a split job
#[derive(Debug, Clone, PartialEq, Getters, Serialize)]
pub struct SplitSummary {
    /// Atoms in the input structure
    num_atoms: usize,
    selection: Selection,
    /// Target first, then remainder
    fragments: [FragmentSummary; 2],
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [target, remainder] = &self.fragments;
        writeln!(f, "Target selected by {}", self.selection)?;
        writeln!(
            f,
            "Wrote {} (n={}) and {} (n={})",
            target.structure_file.display(),
            target.num_atoms,
            remainder.structure_file.display(),
            remainder.num_atoms
        )?;
        writeln!(
            f,
            "Created {} and {}",
            target.input_file.display(),
            remainder.input_file.display()
        )?;
        write!(
            f,
            "Charges/multiplicities used: {} {}/{}, {} {}/{}",
            target.name,
            target.charge,
            target.multiplicity,
            remainder.name,
            remainder.charge,
            remainder.multiplicity
        )
    }
}

/// A fragment ready to be written
struct PreparedFragment<'a> {
    settings: &'a FragmentSettings,
    structure: Structure,
    input: OrcaInput,
}

impl SplitConfig {
    /// Split `structure` according to these settings
    pub fn partition(&self, structure: &Structure) -> Result<Partition> {
        let mut builder = PartitionerBuilder::default();
        builder
            .cutoff_mult(self.cutoff_mult)
            .skin(self.skin)
            .marker(self.marker.clone())
            .strategy(self.neighbor_search);
        if let Some(numbers) = &self.target_indices {
            builder.target_indices(numbers.clone());
        }
        builder
            .build()
            .map_err(|e| Error::Config(e.to_string()))?
            .partition(structure)
    }

    /// Input deck for one fragment
    pub fn orca_input(&self, fragment: &FragmentSettings) -> OrcaInput {
        OrcaInput {
            xyz_file: fragment.structure_file(),
            charge: fragment.charge,
            multiplicity: fragment.multiplicity,
            nprocs: self.nprocs,
            maxcore_mb: self.maxcore,
            method: self.method.clone(),
            grid: fragment.grid.unwrap_or(self.grid),
            chelpg: self.chelpg,
        }
    }

    fn prepare<'a>(
        &'a self,
        settings: &'a FragmentSettings,
        structure: &Structure,
        indices: &[usize],
    ) -> PreparedFragment<'a> {
        if indices.is_empty() {
            log::warn!("Fragment '{}' contains no atoms", settings.name);
        }
        PreparedFragment {
            settings,
            structure: structure.subset(indices),
            input: self.orca_input(settings),
        }
    }
}

fn write_fragment(output_dir: &Path, fragment: &PreparedFragment) -> Result<FragmentSummary> {
    let structure_file = output_dir.join(fragment.settings.structure_file());
    let input_file = output_dir.join(fragment.settings.input_file());
    io::write_structure(&structure_file, &fragment.structure)?;
    std::fs::write(&input_file, fragment.input.to_string())?;
    Ok(FragmentSummary {
        name: fragment.settings.name.clone(),
        num_atoms: fragment.structure.len(),
        charge: fragment.settings.charge,
        multiplicity: fragment.settings.multiplicity,
        structure_file,
        input_file,
    })
}

/// Read, partition and write both fragments with their input decks
pub fn run_split(config: &SplitConfig) -> Result<SplitSummary> {
    config.validate()?;
    let structure = io::read_structure(&config.input)?;
    log::info!(
        "Read {} atoms from {}",
        structure.len(),
        config.input.display()
    );
    let partition = config.partition(&structure)?;
    log::info!("Target selected by {}", partition.selection());

    let fragments = [
        config.prepare(&config.target, &structure, partition.target()),
        config.prepare(&config.remainder, &structure, partition.remainder()),
    ];

    std::fs::create_dir_all(&config.output_dir)?;
    let [target, remainder] = &fragments;
    Ok(SplitSummary {
        num_atoms: structure.len(),
        selection: partition.selection().clone(),
        fragments: [
            write_fragment(&config.output_dir, target)?,
            write_fragment(&config.output_dir, remainder)?,
        ],
    })
}
