use clap::Parser;

use crate::io::DEFAULT_MAX_ARCHIVE_BYTES;
use crate::report::{SectionKey, SectionTable};

#[derive(Parser, Debug)]
#[command(name = "termreport")]
#[command(version)]
#[command(about = "Render terminal transcripts from a report ZIP", long_about = None)]
#[command(after_help = "Examples:\n  \
  termreport result.zip                        print every section as plain text\n  \
  termreport result.zip -s ip_quality --html   HTML fragment of the IP section\n  \
  termreport -l https://example.com/r/id.zip   list files of a remote report")]
pub struct Cli {
    /// Report ZIP path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List archive entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// Verbose listing (with -l) and debug logging
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Only decode these sections (repeatable)
    #[arg(short = 's', long = "section", value_name = "KEY")]
    pub sections: Vec<SectionKey>,

    /// Override a section label
    #[arg(long = "label", value_name = "KEY=TEXT", value_parser = parse_label)]
    pub labels: Vec<(SectionKey, String)>,

    /// Print HTML fragments instead of plain text
    #[arg(long)]
    pub html: bool,

    /// Print only the report image links
    #[arg(long, conflicts_with = "html")]
    pub links: bool,

    /// Refuse archives larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_ARCHIVE_BYTES)]
    pub max_bytes: u64,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Section table after applying `--section` and `--label`
    pub fn section_table(&self) -> SectionTable {
        let mut table = SectionTable::default();
        if !self.sections.is_empty() {
            table.retain_keys(&self.sections);
        }
        for (key, label) in &self.labels {
            table.set_label(*key, label.clone());
        }
        table
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

fn parse_label(value: &str) -> Result<(SectionKey, String), String> {
    let (key, label) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=TEXT, got '{value}'"))?;
    Ok((key.trim().parse()?, label.to_string()))
}
