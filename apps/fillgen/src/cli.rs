use std::path::PathBuf;

use clap::Parser;

/// Generate deterministic filler files for upload and storage testing
#[derive(Debug, Parser)]
#[command(name = "fillgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File size, e.g. 500MB, 1.5GiB, 1TB (1 MiB to 1 TiB)
    #[arg(required_unless_present = "list_types")]
    pub size: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File name (extension added from the file type when missing)
    #[arg(short, long)]
    pub name: Option<String>,

    /// File type preset, see --list-types
    #[arg(short = 't', long = "type")]
    pub file_type: Option<String>,

    /// Write chunk size, e.g. 1MiB
    #[arg(long)]
    pub chunk_size: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List available file type presets and exit
    #[arg(long)]
    pub list_types: bool,

    /// Print progress and the summary as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "fillgen",
            "500MB",
            "-o",
            "/tmp/out",
            "-n",
            "sample",
            "-t",
            "pdf",
            "--chunk-size",
            "4MiB",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.size.as_deref(), Some("500MB"));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.name.as_deref(), Some("sample"));
        assert_eq!(cli.file_type.as_deref(), Some("pdf"));
        assert_eq!(cli.chunk_size.as_deref(), Some("4MiB"));
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn size_required_without_list_types() {
        assert!(Cli::try_parse_from(["fillgen"]).is_err());
        let cli = Cli::try_parse_from(["fillgen", "--list-types"]).unwrap();
        assert!(cli.list_types);
        assert!(cli.size.is_none());
    }

    #[test]
    fn parses_json_flag() {
        let cli = Cli::try_parse_from(["fillgen", "2MiB", "--json"]).unwrap();
        assert!(cli.json);
        assert!(!cli.quiet);
    }

    #[test]
    fn verify_command() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
