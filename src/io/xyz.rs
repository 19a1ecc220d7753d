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

//! Native XYZ format reader and writer.

use crate::{Atom, Error, Result, Structure};
use std::io::{BufRead, Lines, Write};
use std::path::{Path, PathBuf};

/// Reads consecutive XYZ frames from a buffered stream
pub(crate) struct XyzReader<R: BufRead> {
    lines: Lines<R>,
    /// Number of lines consumed so far
    line_number: usize,
    path: PathBuf,
}

impl<R: BufRead> XyzReader<R> {
    /// `path` is only used in error messages
    pub fn new(reader: R, path: &Path) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            path: path.to_path_buf(),
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(&self.path, self.line_number, message)
    }

    /// Next frame, or `None` at end of stream.
    ///
    /// Blank lines where a count line is expected count as end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Structure>> {
        let count_line = match self.next_line()? {
            Some(line) if !line.trim().is_empty() => line,
            _ => return Ok(None),
        };
        let num_atoms: usize = count_line
            .trim()
            .parse()
            .map_err(|_| self.error(format!("invalid atom count '{}'", count_line.trim())))?;

        let comment = self
            .next_line()?
            .ok_or_else(|| self.error("missing comment line"))?;

        // the count line is untrusted until the atom lines are read
        let mut atoms = Vec::with_capacity(num_atoms.min(4096));
        for _ in 0..num_atoms {
            let line = self.next_line()?.ok_or_else(|| {
                self.error(format!(
                    "expected {} atoms but found {}",
                    num_atoms,
                    atoms.len()
                ))
            })?;
            atoms.push(self.parse_atom(&line)?);
        }
        Ok(Some(Structure::new(atoms).with_comment(comment.trim())))
    }

    fn parse_atom(&self, line: &str) -> Result<Atom> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(self.error(format!("malformed atom line '{}'", line.trim())));
        }
        let mut coords = [0.0; 3];
        for (coord, (axis, text)) in coords.iter_mut().zip(["x", "y", "z"].iter().zip(&parts[1..4])) {
            *coord = text
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| self.error(format!("invalid {axis} coordinate '{text}'")))?;
        }
        Ok(Atom::new(parts[0], coords))
    }
}

impl<R: BufRead> Iterator for XyzReader<R> {
    type Item = Result<Structure>;
    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Write one frame: atom count, comment and `symbol x y z` lines
pub(crate) fn write_frame(writer: &mut impl Write, structure: &Structure) -> std::io::Result<()> {
    writeln!(writer, "{}", structure.len())?;
    writeln!(writer, "{}", structure.comment().unwrap_or(""))?;
    for atom in structure.atoms() {
        let pos = atom.pos();
        writeln!(
            writer,
            "{:<2} {:>16.8} {:>16.8} {:>16.8}",
            atom.symbol(),
            pos.x,
            pos.y,
            pos.z
        )?;
    }
    Ok(())
}
