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

//! Single point input deck producing electrostatic potential and density cubes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of cube grid points along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridDims(pub [u32; 3]);

impl Default for GridDims {
    fn default() -> Self {
        Self([120; 3])
    }
}

impl FromStr for GridDims {
    type Err = String;

    /// Parse `"d1,d2,d3"` with positive integers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| format!("invalid grid dimension '{}' in '{s}'", v.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        <[u32; 3]>::try_from(values)
            .map(Self)
            .map_err(|v| format!("expected three grid dimensions, got {}", v.len()))
    }
}

impl TryFrom<String> for GridDims {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GridDims> for String {
    fn from(dims: GridDims) -> Self {
        dims.to_string()
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [d1, d2, d3] = self.0;
        write!(f, "{d1},{d2},{d3}")
    }
}

/// ORCA single point calculation writing ESP and density cubes
#[derive(Debug, Clone, PartialEq)]
pub struct OrcaInput {
    /// Coordinate file read by ORCA, relative to the input deck
    pub xyz_file: String,
    /// Net charge
    pub charge: i32,
    /// Spin multiplicity
    pub multiplicity: u32,
    /// Number of MPI processes
    pub nprocs: u32,
    /// Memory per core (MB)
    pub maxcore_mb: u32,
    /// Method and basis, e.g. `B3LYP D3BJ def2-TZVP`
    pub method: String,
    /// Cube grid
    pub grid: GridDims,
    /// Add a CHELPG charge fit to the ESP
    pub chelpg: bool,
}

impl fmt::Display for OrcaInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [d1, d2, d3] = self.grid.0;
        writeln!(f, "! SP {} TightSCF", self.method)?;
        writeln!(f)?;
        writeln!(f, "%pal nprocs {} end", self.nprocs)?;
        writeln!(f, "%maxcore {}", self.maxcore_mb)?;
        writeln!(f)?;
        writeln!(f, "%plots")?;
        writeln!(f, "  Format Gaussian_Cube")?;
        writeln!(f, "  ElPot true")?;
        writeln!(f, "  Density true")?;
        writeln!(f, "  Dim1 {d1}")?;
        writeln!(f, "  Dim2 {d2}")?;
        writeln!(f, "  Dim3 {d3}")?;
        writeln!(f, "end")?;
        writeln!(f)?;
        if self.chelpg {
            writeln!(f, "CHELPG")?;
        }
        writeln!(
            f,
            "* xyzfile {} {} {}",
            self.charge, self.multiplicity, self.xyz_file
        )
    }
}
