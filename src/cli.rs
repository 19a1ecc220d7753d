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

use crate::{
    config::{Job, JobFile, JobReport},
    frames::ExtractConfigBuilder,
    neighbor::NeighborStrategy,
    orca::{output::ConvertConfigBuilder, GridDims},
    split::{parse_index_list, FragmentSettings, SplitConfig, SplitConfigBuilder},
    Error,
};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use std::{io::Write, path::PathBuf};

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write selected frames of a multi-frame XYZ trajectory to separate files
    #[clap(arg_required_else_help = true)]
    Extract {
        /// Trajectory in XYZ format
        #[clap(long, short = 'i')]
        input: PathBuf,
        /// Output directory
        #[clap(long, short = 'o', default_value = "frames")]
        output_dir: PathBuf,
        /// 1-based frame numbers, e.g. 4,8,11 (default: all frames)
        #[clap(long, short = 'f', value_delimiter = ',')]
        frames: Vec<usize>,
        /// Output file name prefix
        #[clap(long, default_value = "frame")]
        prefix: String,
    },
    /// Collect coordinate blocks of an ORCA output into an XYZ trajectory
    #[clap(arg_required_else_help = true)]
    Convert {
        /// ORCA output file
        input: PathBuf,
        /// Trajectory to write
        output: PathBuf,
    },
    /// Split a complex into two fragments and write ORCA ESP inputs
    #[clap(arg_required_else_help = true)]
    Split(SplitArgs),
    /// Run jobs listed in a YAML file
    #[clap(arg_required_else_help = true)]
    Run {
        /// Job file in YAML format
        #[clap(long, short = 'i')]
        input: PathBuf,
    },
}

#[derive(Debug, ClapArgs)]
struct SplitArgs {
    /// Structure of the complex (.xyz)
    input: PathBuf,
    /// Output directory
    #[clap(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,
    /// 1-based atom numbers of the target, comma separated (skips connectivity analysis)
    #[clap(long)]
    target_indices: Option<String>,
    /// Neighbor cutoff multiplier applied to covalent radii
    #[clap(long, default_value_t = 1.0)]
    cutoff_mult: f64,
    /// Extra distance added to each pair cutoff (Å)
    #[clap(long, default_value_t = 0.0)]
    skin: f64,
    /// Element marking the target component
    #[clap(long, default_value = "P")]
    marker: String,
    /// Neighbor search strategy
    #[clap(long, value_enum, default_value_t = NeighborStrategy::CellGrid)]
    neighbor_search: NeighborStrategy,
    /// Base name of the target files
    #[clap(long, default_value = "ump")]
    target_name: String,
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    target_charge: i32,
    #[clap(long, default_value_t = 1)]
    target_mult: u32,
    /// Base name of the remainder files
    #[clap(long, default_value = "surface")]
    remainder_name: String,
    #[clap(long, default_value_t = 0, allow_negative_numbers = true)]
    remainder_charge: i32,
    #[clap(long, default_value_t = 1)]
    remainder_mult: u32,
    /// Number of processes for ORCA
    #[clap(long, default_value_t = 8)]
    nprocs: u32,
    /// Memory per core (MB)
    #[clap(long, default_value_t = 2000)]
    maxcore: u32,
    /// Method and basis line
    #[clap(long, default_value = "B3LYP D3BJ def2-TZVP")]
    method: String,
    /// Cube grid dimensions Dim1,Dim2,Dim3
    #[clap(long, default_value = "120,120,120")]
    dims: GridDims,
    /// Cube grid dimensions for the remainder, e.g. 160,160,160
    #[clap(long)]
    remainder_dims: Option<GridDims>,
    /// Add CHELPG to fit charges to the ESP
    #[clap(long, action)]
    chelpg: bool,
}

impl SplitArgs {
    fn into_config(self) -> Result<SplitConfig> {
        let mut builder = SplitConfigBuilder::default();
        builder
            .input(self.input)
            .output_dir(self.output_dir)
            .cutoff_mult(self.cutoff_mult)
            .skin(self.skin)
            .marker(Some(self.marker))
            .neighbor_search(self.neighbor_search)
            .target(FragmentSettings::new(
                self.target_name,
                self.target_charge,
                self.target_mult,
            ))
            .remainder(FragmentSettings {
                grid: self.remainder_dims,
                ..FragmentSettings::new(
                    self.remainder_name,
                    self.remainder_charge,
                    self.remainder_mult,
                )
            })
            .nprocs(self.nprocs)
            .maxcore(self.maxcore)
            .method(self.method)
            .grid(self.dims)
            .chelpg(self.chelpg);
        if let Some(numbers) = parse_index_list(self.target_indices.as_deref().unwrap_or(""))? {
            builder.target_indices(numbers);
        }
        Ok(builder.build()?)
    }
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
    /// Write a report of the finished jobs in YAML format
    #[clap(long, short = 'r')]
    pub report: Option<PathBuf>,
}

pub fn do_main() -> Result<()> {
    let args = Args::parse();
    if std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(
            DEFAULT_FILTER_ENV,
            if args.verbose { "Debug" } else { "Info" },
        );
    }
    pretty_env_logger::init();

    let jobs = match args.command {
        Commands::Extract {
            input,
            output_dir,
            frames,
            prefix,
        } => {
            let mut builder = ExtractConfigBuilder::default();
            builder.input(input).output_dir(output_dir).prefix(prefix);
            if !frames.is_empty() {
                builder.frames(frames.into_iter().collect());
            }
            vec![Job::Extract(builder.build()?)]
        }
        Commands::Convert { input, output } => vec![Job::Convert(
            ConvertConfigBuilder::default()
                .input(input)
                .output(output)
                .build()?,
        )],
        Commands::Split(split_args) => vec![Job::Split(split_args.into_config()?)],
        Commands::Run { input } => {
            JobFile::from_file(&input)
                .with_context(|| format!("Could not load jobs from '{}'", input.display()))?
                .jobs
        }
    };

    let reports = JobFile { jobs }.run_with(print_report)?;

    if let Some(path) = args.report {
        let mut output = std::fs::File::create(path)?;
        write_yaml(&reports, &mut output, Some("jobs"))?;
    }
    Ok(())
}

fn print_report(report: &JobReport) {
    match report {
        JobReport::Extract(summary) => println!(
            "Extracted {} of {} frame(s)",
            summary.written().len(),
            summary.frames_scanned()
        ),
        JobReport::Convert { frames } => println!("Wrote {frames} frame(s)"),
        JobReport::Split(summary) => println!("{summary}"),
    }
}

/// Exit status for a failed run: 2 when there was nothing to process, otherwise 1
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::NoDataFound { .. }) => 2,
        _ => 1,
    }
}

/// Helper function to serialize data to an existing YAML file
fn write_yaml<T: serde::Serialize>(
    data: &T,
    output: &mut std::fs::File,
    key: Option<&str>,
) -> Result<()> {
    match key {
        Some(key) => {
            let mut wrapper = std::collections::BTreeMap::new();
            wrapper.insert(key.to_string(), data);
            let yaml = serde_yaml::to_string(&wrapper)?;
            output.write_all(yaml.as_bytes())?;
        }
        None => {
            let yaml = serde_yaml::to_string(data)?;
            output.write_all(yaml.as_bytes())?;
        }
    }
    Ok(())
}
