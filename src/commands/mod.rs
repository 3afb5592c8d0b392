//! Pipeline orchestration behind the CLI surface.

use anyhow::Result;
use log::info;
use std::collections::BTreeMap;

use crate::analysis::{self, result::AnalysisReport};
use crate::cli::{Cli, Format, Step};
use crate::io::output::{create_writer, OutputConfig, OutputFormat};
use crate::io::{default_out_path, read_source, save_report};
use crate::parse::parser;
use crate::solve;

/// Run the pipeline up to the selected stage.
pub fn run(cli: &Cli) -> Result<()> {
    let source = read_source(&cli.input)?;
    let unit = parser::parse(&source, &cli.input)?;
    info!("parsed {}", cli.input.display());

    let mut report = AnalysisReport {
        input_file: cli.input.display().to_string(),
        classes: BTreeMap::new(),
    };
    if cli.run != Step::Parse {
        report = analysis::analyze(&unit, &cli.input);
        if cli.run == Step::Evaluate {
            solve::solve_report(&mut report)?;
        }
    }

    // every stage persists the report when asked, a parse-only run included
    if cli.save || cli.out.is_some() {
        let path = cli
            .out
            .clone()
            .unwrap_or_else(|| default_out_path(&cli.input));
        save_report(&report, &path)?;
    }
    if cli.run == Step::Parse {
        return Ok(());
    }

    let format = match cli.format {
        Format::Json => OutputFormat::Json,
        Format::Terminal => OutputFormat::Terminal,
    };
    let config = OutputConfig {
        color: !cli.no_color,
    };
    create_writer(format, config).write_report(&report)
}
