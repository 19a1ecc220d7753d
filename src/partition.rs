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

//! Connectivity-based partitioning of a structure into two fragments.
//!
//! Atoms are bonded when closer than the sum of their scaled covalent radii.
//! The connected components of this bond graph are searched for one that
//! contains a marker element (e.g. phosphorus); that component becomes the
//! _target_ fragment and everything else the _remainder_. If no component
//! holds the marker, the largest component is used.
//!
//! When several components qualify, the first one in discovery order is taken.
//! Discovery order follows the lowest atom index of each component.

use crate::element::covalent_radius;
use crate::neighbor::{Adjacency, NeighborList, NeighborStrategy};
use crate::{Error, Point, Result, Structure};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Connected components of a graph.
///
/// Each component is sorted in ascending order, and components appear in the
/// order they are discovered when scanning vertices from index zero.
pub fn connected_components(graph: &impl Adjacency) -> Vec<Vec<usize>> {
    let mut visited = vec![false; graph.num_nodes()];
    let mut components = Vec::new();
    let mut stack = Vec::new();
    for start in 0..graph.num_nodes() {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        stack.push(start);
        while let Some(i) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            component.push(i);
            stack.extend(graph.neighbors(i).iter().filter(|&&j| !visited[j]));
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Per-atom bonding cutoffs: covalent radius times `cutoff_mult`
pub fn bonding_cutoffs(structure: &Structure, cutoff_mult: f64) -> Result<Vec<f64>> {
    structure
        .symbols()
        .map(|symbol| {
            covalent_radius(symbol)
                .map(|radius| radius * cutoff_mult)
                .ok_or_else(|| Error::UnknownElement(symbol.to_string()))
        })
        .collect()
}

/// Connected components of the bond graph of `structure`
pub fn components(
    structure: &Structure,
    cutoff_mult: f64,
    skin: f64,
    strategy: NeighborStrategy,
) -> Result<Vec<Vec<usize>>> {
    if structure.is_empty() {
        return Err(Error::EmptyStructure);
    }
    let cutoffs = bonding_cutoffs(structure, cutoff_mult)?;
    let positions: Vec<Point> = structure.positions().copied().collect();
    let neighbors = NeighborList::new(&positions, &cutoffs, skin, strategy);
    log::debug!(
        "Found {} bonded pairs among {} atoms",
        neighbors.num_pairs(),
        structure.len()
    );
    Ok(connected_components(&neighbors))
}

/// How the target fragment was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Explicit list of atom indices given by the user
    Override,
    /// `component`-th connected component, the first containing the marker element
    Marker { element: String, component: usize },
    /// `component`-th connected component, the first of largest size
    Largest { component: usize },
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "explicit atom indices"),
            Self::Marker { element, component } => {
                write!(f, "component {} containing {}", component + 1, element)
            }
            Self::Largest { component } => write!(f, "largest component ({})", component + 1),
        }
    }
}

/// Two-way split of all atom indices
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Partition {
    /// 0-based indices of the target fragment
    target: Vec<usize>,
    /// Sorted 0-based indices of all other atoms
    remainder: Vec<usize>,
    /// Rule that selected the target
    selection: Selection,
    /// Number of connected components; `None` if connectivity was not analysed
    num_components: Option<usize>,
}

impl Partition {
    /// Split `0..num_atoms` into `target` and its sorted complement
    fn from_target(target: Vec<usize>, num_atoms: usize, selection: Selection) -> Self {
        let members: BTreeSet<usize> = target.iter().copied().collect();
        let remainder = (0..num_atoms).filter(|i| !members.contains(i)).collect();
        Self {
            target,
            remainder,
            selection,
            num_components: None,
        }
    }
}

/// Convert 1-based atom numbers to 0-based indices into a structure of `num_atoms`.
///
/// Fails on an empty list, on numbers outside `1..=num_atoms` and on duplicates.
pub fn to_zero_based(numbers: &[usize], num_atoms: usize) -> Result<Vec<usize>> {
    if numbers.is_empty() {
        return Err(Error::InvalidIndex("empty index list".to_string()));
    }
    let mut seen = BTreeSet::new();
    numbers
        .iter()
        .map(|&number| {
            if number == 0 || number > num_atoms {
                return Err(Error::InvalidIndex(format!(
                    "{number} is outside 1..={num_atoms}"
                )));
            }
            if !seen.insert(number) {
                return Err(Error::InvalidIndex(format!("{number} is listed twice")));
            }
            Ok(number - 1)
        })
        .collect()
}

/// Settings for splitting a structure into a target fragment and a remainder
#[derive(Debug, Clone, Builder, Getters)]
#[builder(default)]
pub struct Partitioner {
    /// Scaling applied to covalent radii
    cutoff_mult: f64,
    /// Extra distance (Å) added to every pair cutoff
    skin: f64,
    /// Element whose presence marks the target component; `None` always picks the largest
    marker: Option<String>,
    /// Neighbor search strategy
    strategy: NeighborStrategy,
    /// 1-based atom numbers that bypass the connectivity analysis
    #[builder(setter(into, strip_option))]
    target_indices: Option<Vec<usize>>,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            cutoff_mult: 1.0,
            skin: 0.0,
            marker: Some("P".to_string()),
            strategy: NeighborStrategy::default(),
            target_indices: None,
        }
    }
}

impl Partitioner {
    /// Split `structure` into target and remainder.
    ///
    /// An explicit index override takes precedence; otherwise the target is the
    /// first component containing the marker element, or else the first largest one.
    pub fn partition(&self, structure: &Structure) -> Result<Partition> {
        if structure.is_empty() {
            return Err(Error::EmptyStructure);
        }
        if let Some(numbers) = &self.target_indices {
            let target = to_zero_based(numbers, structure.len())?;
            return Ok(Partition::from_target(
                target,
                structure.len(),
                Selection::Override,
            ));
        }
        if self.cutoff_mult.is_nan() || self.cutoff_mult <= 0.0 {
            return Err(Error::Config(format!(
                "cutoff multiplier must be positive, got {}",
                self.cutoff_mult
            )));
        }
        if self.skin.is_nan() || self.skin < 0.0 {
            return Err(Error::Config(format!(
                "skin must be non-negative, got {}",
                self.skin
            )));
        }

        let components = components(structure, self.cutoff_mult, self.skin, self.strategy)?;
        log::info!("Found {} connected component(s)", components.len());

        let symbols: Vec<&str> = structure.symbols().collect();
        let with_marker = self.marker.as_deref().and_then(|marker| {
            components
                .iter()
                .position(|c| c.iter().any(|&i| symbols[i] == marker))
                .map(|component| (component, marker))
        });
        let (index, selection) = match with_marker {
            Some((component, marker)) => (
                component,
                Selection::Marker {
                    element: marker.to_string(),
                    component,
                },
            ),
            None => {
                if let Some(marker) = &self.marker {
                    log::warn!("No component contains {marker}; using the largest component");
                }
                let component = first_largest(&components);
                (component, Selection::Largest { component })
            }
        };
        let mut partition =
            Partition::from_target(components[index].clone(), structure.len(), selection);
        partition.num_components = Some(components.len());
        Ok(partition)
    }
}

/// Index of the first component among those with the most members
fn first_largest(components: &[Vec<usize>]) -> usize {
    let mut best = 0;
    for (i, component) in components.iter().enumerate() {
        if component.len() > components[best].len() {
            best = i;
        }
    }
    best
}
