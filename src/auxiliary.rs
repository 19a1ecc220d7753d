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

//! Transparent gzip handling for input and output files.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True if the file name ends with `.gz`
pub(crate) fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("gz"))
}

/// Open a file for buffered reading; gzip content is detected by its magic bytes.
pub(crate) fn open_maybe_compressed(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read a whole file, decompressing if needed and replacing invalid UTF-8.
pub(crate) fn read_to_string_lossy(path: &Path) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    open_maybe_compressed(path)?.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Output file, gzip compressed or plain.
///
/// Call [`OutputStream::finish`] when done; dropping the stream silently
/// ignores errors from the final flush and the gzip trailer.
pub(crate) enum OutputStream {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputStream {
    /// Flush all buffered data and, for gzip, write the trailer
    pub fn finish(self) -> std::io::Result<()> {
        match self {
            Self::Plain(mut writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Create a file for writing; compressed if the name ends with `.gz`.
pub(crate) fn open_compressed(path: &Path) -> std::io::Result<OutputStream> {
    let file = BufWriter::new(File::create(path)?);
    if is_gzip_path(path) {
        Ok(OutputStream::Gzip(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(OutputStream::Plain(file))
    }
}
