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

//! Interfacing with the ORCA quantum chemistry program.
//!
//! - [`output`] reads coordinate blocks from optimisation and scan outputs.
//! - [`input`] renders single point input decks for electrostatic potential cubes.

pub mod input;
pub mod output;

pub use input::{GridDims, OrcaInput};
