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

use crate::Point;
use derive_getters::Getters;

/// Element symbol and position of a single atom
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Atom {
    /// Element symbol (He, C, O, Fe, etc.)
    symbol: String,
    /// Cartesian position (angstrom)
    pos: Point,
}

impl Atom {
    pub fn new(symbol: impl Into<String>, pos: impl Into<Point>) -> Self {
        Self {
            symbol: symbol.into(),
            pos: pos.into(),
        }
    }
}

/// Ordered list of atoms forming one molecular geometry
///
/// Atoms are identified by their index in the list only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    atoms: Vec<Atom>,
    comment: Option<String>,
}

impl Structure {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.atoms.iter().map(|atom| atom.symbol.as_str())
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point> + '_ {
        self.atoms.iter().map(|atom| &atom.pos)
    }

    /// New structure with the atoms at `indices`, in that order.
    ///
    /// The comment is carried over. Panics if an index is out of range.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            atoms: indices.iter().map(|&i| self.atoms[i].clone()).collect(),
            comment: self.comment.clone(),
        }
    }
}

impl FromIterator<Atom> for Structure {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
