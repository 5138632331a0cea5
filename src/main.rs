use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::{
    cobol::{CallConvention, Config, Dialect},
    error::InternalError,
};

mod backend;
mod cobol;
mod common;
mod corpus;
mod driver;
mod error;
mod extract;
mod parser;
mod types;

#[derive(Parser)]
#[command(
    name = "cobolt",
    version,
    about = "Translate typed function problems into COBOL programs with a test harness"
)]
pub struct Cli {
    /// Log more (-v for progress, -vv for details); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Translate a single problem file
    Translate {
        #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Write the program to this file instead of standard output
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Only emit the candidate's prompt
        #[arg(long, conflicts_with = "tests_only")]
        prompt_only: bool,

        /// Only emit the test harness
        #[arg(long)]
        tests_only: bool,

        #[command(flatten)]
        opts: TranslateOpts,
    },
    /// Translate and compile every problem in a directory
    Corpus {
        #[arg(value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Directory receiving the translated programs
        #[arg(long, default_value = "cobol")]
        out: PathBuf,

        /// Translate only
        #[arg(long, default_value_t = false)]
        no_compile: bool,

        #[command(flatten)]
        opts: TranslateOpts,

        #[command(flatten)]
        build: BuildOpts,
    },
    /// Compile every program in a directory and list the ones that built
    Compile {
        #[arg(value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        #[command(flatten)]
        build: BuildOpts,
    },
    /// Build and run one program, then classify the result
    Evaluate {
        #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        build: BuildOpts,
    },
    /// Unpack stored completions into compilable programs
    Extract {
        #[arg(value_name = "ARCHIVE", value_hint = clap::ValueHint::FilePath)]
        archive: PathBuf,

        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
pub struct TranslateOpts {
    /// Maximum number of elements of a sequence
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    capacity: u32,

    /// Width of string storage, in bytes
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..))]
    string_width: u32,

    /// Digits of integer storage
    #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u8).range(1..=38))]
    int_digits: u8,

    #[arg(long, value_enum, default_value_t = CallConvention::Reference)]
    convention: CallConvention,

    #[arg(long, value_enum, default_value_t = Dialect::Display)]
    dialect: Dialect,
}

impl TranslateOpts {
    fn config(&self) -> Config {
        Config {
            capacity: self.capacity as usize,
            string_width: self.string_width as usize,
            int_digits: self.int_digits,
            convention: self.convention,
            dialect: self.dialect,
            ..Config::default()
        }
    }
}

#[derive(Args)]
pub struct BuildOpts {
    /// Compiler command; the output and source paths are appended
    #[arg(long, default_value = "cobc -x -free")]
    compiler: String,

    /// Seconds before a build or run is killed
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Entry point, parses command line arguments and runs the requested subcommand.
pub fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match driver::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(InternalError::Aborted) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", "internal error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
