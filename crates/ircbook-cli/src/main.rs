mod cli;

use clap::Parser;
use cli::Cli;
use ircbook_core::{run, ParseReport, RunConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn report_summary(report: &ParseReport) {
    eprintln!(
        "pages {}-{}: {} sections, {} tables, {} warnings",
        report.page_start,
        report.page_end,
        report.sections_emitted,
        report.tables_emitted,
        report.warnings.len(),
    );
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = RunConfig {
        pdf_path: cli.pdf,
        out_dir: cli.out,
        page_start: cli.page_start,
        page_end: cli.page_end,
        debug_dump: cli.debug_dump,
    };

    match run(config) {
        Ok(report) => {
            report_summary(&report);
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
