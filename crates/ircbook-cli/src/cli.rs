use std::path::PathBuf;

use clap::Parser;

/// Extract IRC 2021 sections and tables from a specific PDF edition.
///
/// This tool does one thing: given an input PDF and an output directory, it
/// runs the full page-layout analysis pipeline and writes section/table
/// files, a parse report, and provenance artifacts. There are no
/// subcommands.
#[derive(Debug, Parser)]
#[command(name = "ircbook", about, version)]
pub struct Cli {
    /// Path to the source PDF file
    #[arg(long, value_name = "FILE")]
    pub pdf: PathBuf,

    /// Output directory for section/table files and diagnostics
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// First page to process (1-indexed, inclusive). Default: first page
    #[arg(long, value_name = "N")]
    pub page_start: Option<usize>,

    /// Last page to process (1-indexed, inclusive). Default: last page.
    /// Clamped with a warning if it exceeds the document's page count.
    #[arg(long, value_name = "N")]
    pub page_end: Option<usize>,

    /// Emit per-page debug artifacts (ruling/line overlays) under
    /// `_debug_pages/`
    #[arg(long)]
    pub debug_dump: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_args() {
        let cli = Cli::parse_from(["ircbook", "--pdf", "irc2021.pdf", "--out", "out"]);
        assert_eq!(cli.pdf, PathBuf::from("irc2021.pdf"));
        assert_eq!(cli.out, PathBuf::from("out"));
        assert!(cli.page_start.is_none());
        assert!(cli.page_end.is_none());
        assert!(!cli.debug_dump);
    }

    #[test]
    fn parse_with_page_range_and_debug_dump() {
        let cli = Cli::parse_from([
            "ircbook",
            "--pdf",
            "irc2021.pdf",
            "--out",
            "out",
            "--page-start",
            "100",
            "--page-end",
            "150",
            "--debug-dump",
        ]);
        assert_eq!(cli.page_start, Some(100));
        assert_eq!(cli.page_end, Some(150));
        assert!(cli.debug_dump);
    }

    #[test]
    fn missing_required_pdf_arg_fails() {
        let result = Cli::try_parse_from(["ircbook", "--out", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_out_arg_fails() {
        let result = Cli::try_parse_from(["ircbook", "--pdf", "irc2021.pdf"]);
        assert!(result.is_err());
    }
}
