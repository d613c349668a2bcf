use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blobts",
    about = "Time-indexed blob storage in a replicated git repository",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Working copy root; overrides the configuration file
    #[arg(short, long, global = true)]
    pub repo: Option<PathBuf>,

    /// Compressor (zstd, gzip, zlib); overrides the configuration file
    #[arg(long, global = true)]
    pub compression: Option<String>,

    /// Encryption key file; overrides the configuration file
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a record, or a JSON-lines batch of records
    Add(AddArgs),
    /// Get records in a time range
    Get(GetArgs),
    /// Generate a new encryption key
    Keygen(KeygenArgs),
    /// Show the timestamp encoded in record file names
    DecodeName(DecodeNameArgs),
    /// Check that the repository can be used as a store
    Check,
}

#[derive(Args)]
pub struct AddArgs {
    /// Payload file; stdin when absent
    pub file: Option<PathBuf>,
    /// Record time: epoch seconds or text such as "2020-03-03 10:00".
    /// A bare number is always seconds, so "2020" is 33 minutes past the
    /// epoch; write "2020-01-01" for the year
    #[arg(short, long, conflicts_with = "batch")]
    pub time: Option<String>,
    /// JSON-lines file of {"time": ..., "data": [bytes]} objects
    #[arg(long, conflicts_with = "file")]
    pub batch: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Range start; open when absent. Same forms as `add --time`: a bare
    /// number such as "2020" is epoch seconds, not a year
    #[arg(short, long, allow_hyphen_values = true)]
    pub start: Option<String>,
    /// Range end; open when absent. Bare numbers are epoch seconds
    #[arg(short, long, allow_hyphen_values = true)]
    pub end: Option<String>,
    /// Pull from the remote first
    #[arg(long)]
    pub pull: bool,
    /// Write each payload to a file in this directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Write the key to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct DecodeNameArgs {
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_file() {
        let cli =
            Cli::try_parse_from(["blobts", "add", "payload.bin", "--time", "2020-03-03"]).unwrap();
        let Command::Add(args) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(args.file, Some("payload.bin".into()));
        assert_eq!(args.time.as_deref(), Some("2020-03-03"));
    }

    #[test]
    fn parse_add_batch_conflicts_with_file() {
        assert!(Cli::try_parse_from(["blobts", "add", "--batch", "b.jsonl"]).is_ok());
        assert!(Cli::try_parse_from(["blobts", "add", "p.bin", "--batch", "b.jsonl"]).is_err());
    }

    #[test]
    fn parse_get_range() {
        let cli = Cli::try_parse_from(["blobts", "get", "-s", "-1.5", "-e", "now", "--pull"]).unwrap();
        let Command::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.start.as_deref(), Some("-1.5"));
        assert_eq!(args.end.as_deref(), Some("now"));
        assert!(args.pull);
        assert!(args.out.is_none());
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "blobts", "check", "--repo", "/srv/blobs", "--compression", "zstd", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.repo, Some("/srv/blobs".into()));
        assert_eq!(cli.compression.as_deref(), Some("zstd"));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_keygen() {
        let cli = Cli::try_parse_from(["blobts", "keygen", "-o", "key"]).unwrap();
        let Command::Keygen(args) = cli.command else {
            panic!("expected keygen");
        };
        assert_eq!(args.out, Some("key".into()));
    }

    #[test]
    fn parse_decode_name_requires_names() {
        assert!(Cli::try_parse_from(["blobts", "decode-name"]).is_err());
        let cli = Cli::try_parse_from(["blobts", "decode-name", "AB.AE", "CD.AE"]).unwrap();
        let Command::DecodeName(args) = cli.command else {
            panic!("expected decode-name");
        };
        assert_eq!(args.names.len(), 2);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["blobts", "--format", "json", "get"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
