//! Main entry point for the termreport CLI application.
//!
//! Loads a report archive from disk or HTTP, decodes its sections and
//! prints them as plain text, HTML fragments, or a list of image links.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use termreport::{
    ArchiveSource, Cli, HttpArchive, LocalArchive, Report, build_report, escape_html,
    read_directory,
};

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let source: Box<dyn ArchiveSource> = if cli.is_http_url() {
        Box::new(HttpArchive::new(cli.file.clone())?)
    } else {
        Box::new(LocalArchive::new(&cli.file))
    };

    let data = source.load(cli.max_bytes).await?;
    tracing::debug!(source = %source.describe(), bytes = data.len(), "loaded archive");

    // List mode: display archive contents and exit
    if cli.list {
        return list_entries(&data, cli.verbose);
    }

    let report = build_report(&data, &cli.section_table());
    if report.is_empty() {
        if !cli.quiet {
            eprintln!(
                "No report sections could be decoded from {}. Download the raw archive instead.",
                source.describe()
            );
        }
        return Ok(());
    }

    if cli.links {
        print_links(&report);
    } else if cli.html {
        print_html(&report);
    } else {
        print_plain(&report, cli.quiet);
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the CLI verbosity flags.
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// List entries in the archive directory.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just entry names, one per line
/// - Verbose format (`-v`): Table with sizes, compression ratio and method
fn list_entries(data: &[u8], verbose: bool) -> Result<()> {
    let index = read_directory(data)?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>6}  {:>10}  Name",
            "Length", "Size", "Cmpr", "Method", "Offset"
        );
        println!("{}", "-".repeat(70));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &index {
        if verbose {
            println!(
                "{:>10}  {:>10}  {}  {:>6}  {:>10}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio(entry.compressed_size, entry.uncompressed_size),
                entry.method.name(),
                entry.lfh_offset,
                entry.display_name()
            );

            if !entry.is_directory() {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.display_name());
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>18}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }

    Ok(())
}

/// Compression ratio as percentage saved
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

fn print_plain(report: &Report, quiet: bool) {
    let multiple = report.sections.len() > 1;
    for section in &report.sections {
        if multiple && !quiet {
            println!("--- {} ---", section.label);
        }
        println!("{}", section.plain.trim_end_matches('\n'));
    }
}

fn print_html(report: &Report) {
    for section in &report.sections {
        println!(
            "<pre data-section=\"{}\" data-label=\"{}\">{}</pre>",
            section.key,
            escape_html(&section.label),
            section.html
        );
    }
}

fn print_links(report: &Report) {
    for section in &report.sections {
        for link in &section.links {
            println!("{}\t{}", section.key, link);
        }
    }
}
