use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Pipeline stages. Each stage implies the ones before it; the pipeline
/// stops after the selected stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Parse the input and stop
    Parse,
    /// Parse and extract dataflows
    Analyze,
    /// Parse, extract dataflows, and solve level constraints
    Evaluate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "javaflow")]
#[command(about = "Static information-flow analyzer for Java programs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Input Java source file
    pub input: PathBuf,

    /// Last pipeline stage to run
    #[arg(short = 'r', long = "run", value_enum, default_value = "evaluate")]
    pub run: Step,

    /// Report destination; implies --save
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write the JSON report to disk (default destination: out/<stem>.json)
    #[arg(long)]
    pub save: bool,

    /// Stdout format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: Format,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["javaflow", "Cls1.java"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("Cls1.java"));
        assert_eq!(cli.run, Step::Evaluate);
        assert_eq!(cli.format, Format::Terminal);
        assert!(cli.out.is_none());
        assert!(!cli.save);
        assert!(!cli.no_color);
    }

    #[test]
    fn test_stage_selection_short_flag() {
        let cli = Cli::try_parse_from(["javaflow", "Cls1.java", "-r", "analyze"]).unwrap();
        assert_eq!(cli.run, Step::Analyze);
    }

    #[test]
    fn test_out_and_format() {
        let cli = Cli::try_parse_from([
            "javaflow",
            "Cls1.java",
            "-o",
            "reports/r.json",
            "-f",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.out, Some(PathBuf::from("reports/r.json")));
        assert_eq!(cli.format, Format::Json);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["javaflow"]).is_err());
    }
}
