use crate::output::ReportFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Type-check every package of a JavaScript/TypeScript monorepo
#[derive(Parser, Debug)]
#[command(
    name = "monocheck",
    about = "Type-check every package of a monorepo and collect the diagnostics into one report",
    version,
    long_about = "monocheck detects the workspace convention of a repository (turbo, pnpm, \
                  yarn, npm, lerna, nx), runs the TypeScript compiler over each package that \
                  has a tsconfig.json, and writes all diagnostics to a single report.\n\n\
                  Examples:\n  \
                  monocheck\n  \
                  monocheck /path/to/repo -o report.tsv\n  \
                  monocheck --format json -o report.json\n  \
                  monocheck --tsconfig tsconfig.build.json"
)]
pub struct CliArgs {
    #[arg(
        value_name = "DIR",
        help = "Repository root to scan (defaults to current directory)"
    )]
    pub directory: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Report path [default: diagnostics.tsv]"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "tsv",
        help = "Report format"
    )]
    pub format: ReportFormatArg,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress progress and the summary line"
    )]
    pub quiet: bool,

    #[arg(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Type-check configuration file name looked up in each package [default: tsconfig.json]"
    )]
    pub tsconfig: Option<String>,

    #[arg(long, value_name = "PATH", help = "Path to the tsc executable")]
    pub tsc: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormatArg {
    Tsv,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Tsv => ReportFormat::Tsv,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}
