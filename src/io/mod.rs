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

//! Structure file I/O.
//!
//! Only the XYZ format is supported, optionally gzip compressed (`.xyz.gz`).

mod xyz;

use crate::auxiliary::{is_gzip_path, open_compressed, open_maybe_compressed};
use crate::{Error, Result, Structure};
use std::path::Path;
pub(crate) use xyz::write_frame;

/// Fail unless the file name looks like XYZ, with or without `.gz`
fn check_format(path: &Path) -> Result<()> {
    let stem_path = if is_gzip_path(path) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    match stem_path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xyz") => Ok(()),
        Some(ext) => Err(Error::Config(format!(
            "unsupported structure format '.{ext}' for '{}'",
            path.display()
        ))),
        None => Err(Error::Config(format!(
            "cannot determine format of '{}': no file extension",
            path.display()
        ))),
    }
}

/// Read the first frame of a structure file.
///
/// ~~~no_run
/// let structure = xyzkit::io::read_structure("complex.xyz").unwrap();
/// println!("{} atoms", structure.len());
/// ~~~
pub fn read_structure(path: impl AsRef<Path>) -> Result<Structure> {
    let path = path.as_ref();
    check_format(path)?;
    let mut reader = xyz::XyzReader::new(open_maybe_compressed(path)?, path);
    reader
        .read_frame()?
        .ok_or_else(|| Error::parse(path, 1, "empty structure file"))
}

/// Read all frames of a trajectory file
pub fn read_trajectory(path: impl AsRef<Path>) -> Result<Vec<Structure>> {
    let path = path.as_ref();
    check_format(path)?;
    xyz::XyzReader::new(open_maybe_compressed(path)?, path).collect()
}

/// Write a single structure, replacing any existing file
pub fn write_structure(path: impl AsRef<Path>, structure: &Structure) -> Result<()> {
    write_trajectory(path, std::slice::from_ref(structure))
}

/// Write frames one after the other into a single file
pub fn write_trajectory(path: impl AsRef<Path>, frames: &[Structure]) -> Result<()> {
    let path = path.as_ref();
    check_format(path)?;
    let mut stream = open_compressed(path)?;
    for frame in frames {
        write_frame(&mut stream, frame)?;
    }
    stream.finish()?;
    Ok(())
}
