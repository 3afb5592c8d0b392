//! Report writers: machine-readable JSON and a compact terminal layout.

use crate::analysis::result::{AnalysisReport, MethodResult};
use colored::Colorize;
use std::io::Write;

/// Terminal layout width; separators and line wrapping both key off it.
const WIDTH: usize = 52;
/// Left padding of wrapped continuation lines, matching the row labels.
const LPAD: usize = 8;
const FLOW_SEP: &str = "⇝";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

pub trait ReportWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Human-oriented layout: per class a header and dashed separators, per
/// method the source text followed by labeled rows of variables, flows and
/// (after the solve stage) verdict and witness levels.
pub struct TerminalWriter<W: Write> {
    writer: W,
    config: OutputConfig,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W, config: OutputConfig) -> Self {
        Self { writer, config }
    }

    fn paint(&self, text: &str) -> String {
        if self.config.color {
            text.blue().to_string()
        } else {
            text.to_string()
        }
    }

    /// Join items into comma-separated lines wrapped at the layout width,
    /// continuation lines padded under the row label. Empty input renders as
    /// a single dash.
    fn joined(&self, items: &[String]) -> String {
        if items.is_empty() {
            return self.paint("-");
        }
        let max_w = WIDTH - LPAD;
        let mut lines: Vec<Vec<&String>> = Vec::new();
        let mut line: Vec<&String> = Vec::new();
        let mut acc = 0;
        for item in items {
            let item_w = item.chars().count() + 2;
            if acc + item_w >= max_w && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                acc = 0;
            }
            acc += item_w;
            line.push(item);
        }
        lines.push(line);
        let continuation = format!("\n{}", " ".repeat(LPAD));
        lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|item| self.paint(item))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join(&continuation)
    }

    fn write_method(&mut self, method: &MethodResult) -> anyhow::Result<()> {
        let name = self.paint(&method.name);
        let vars = self.joined(&method.variables);
        let flows: Vec<String> = method
            .flows
            .iter()
            .map(|(source, sink)| format!("{source}{FLOW_SEP}{sink}"))
            .collect();
        let flows = self.joined(&flows);
        writeln!(self.writer, "{}", method.source)?;
        writeln!(self.writer, "Method: {name}")?;
        writeln!(self.writer, "Vars:   {vars}")?;
        writeln!(self.writer, "Flows:  {flows}")?;
        if let Some(verdict) = method.verdict {
            let verdict = self.paint(&verdict.to_string());
            writeln!(self.writer, "Sat:    {verdict}")?;
        }
        if let Some(model) = &method.model {
            let levels: Vec<String> = model
                .iter()
                .map(|(name, level)| format!("{name}={level}"))
                .collect();
            let levels = self.joined(&levels);
            writeln!(self.writer, "Levels: {levels}")?;
        }
        if !method.skipped.is_empty() {
            writeln!(self.writer, "Skips:  {}", method.skipped.len())?;
        }
        Ok(())
    }
}

impl<W: Write> ReportWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let sep = "-".repeat(WIDTH);
        for (name, class) in &report.classes {
            writeln!(self.writer, "class {}", self.paint(name))?;
            writeln!(self.writer, "{sep}")?;
            let mut first = true;
            for method in class.methods.values() {
                if !first {
                    writeln!(self.writer, "{sep}")?;
                }
                first = false;
                self.write_method(method)?;
            }
        }
        Ok(())
    }
}

/// Writer for the requested format, targeting stdout.
pub fn create_writer(format: OutputFormat, config: OutputConfig) -> Box<dyn ReportWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(std::io::stdout(), config)),
    }
}
