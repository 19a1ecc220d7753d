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

//! Small tools for molecular trajectory files and ORCA input decks.
//!
//! - [`frames`] splits a multi-frame XYZ trajectory into one file per frame.
//! - [`orca::output`] collects coordinate blocks from an ORCA output into a trajectory.
//! - [`split`] partitions a structure into a target fragment and a remainder by
//!   connectivity and writes ORCA electrostatic potential inputs for both.
//!
//! # Examples
//! ~~~
//! use xyzkit::{partition::Partitioner, Atom, Structure};
//!
//! let structure = Structure::new(vec![
//!     Atom::new("O", [0.0, 0.0, 0.0]),
//!     Atom::new("H", [0.96, 0.0, 0.0]),
//!     Atom::new("P", [10.0, 0.0, 0.0]),
//!     Atom::new("O", [11.5, 0.0, 0.0]),
//! ]);
//! let partition = Partitioner::default().partition(&structure).unwrap();
//! assert_eq!(partition.target(), &[2, 3]);
//! assert_eq!(partition.remainder(), &[0, 1]);
//! ~~~

use nalgebra::Vector3;

pub type Point = Vector3<f64>;

mod auxiliary;
pub mod cli;
pub mod config;
pub mod element;
mod error;
pub mod frames;
pub mod io;
pub mod neighbor;
pub mod orca;
pub mod partition;
pub mod split;
mod structure;

pub use error::{Error, Result};
pub use structure::{Atom, Structure};
