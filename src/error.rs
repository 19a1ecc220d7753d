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

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by readers, the partitioner and the job runners.
///
/// All of them end the current run; none are retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or truncated structure or log input
    #[error("Parse error in '{}' at line {line}: {message}", file.display())]
    Parse {
        file: PathBuf,
        /// 1-based line number
        line: usize,
        message: String,
    },

    /// Target override that is empty, out of range or repeats an atom
    #[error("Invalid atom index: {0}")]
    InvalidIndex(String),

    /// Partitioning requested on a structure without atoms
    #[error("Structure contains no atoms")]
    EmptyStructure,

    /// No reference radius for this element symbol
    #[error("No covalent radius for element '{0}'")]
    UnknownElement(String),

    /// Nothing to do: no frames or coordinate blocks were found
    #[error("No {what} found in '{}'", file.display())]
    NoDataFound { what: &'static str, file: PathBuf },

    /// Invalid job settings
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(file: &Path, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.to_path_buf(),
            line,
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(e: validator::ValidationErrors) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
