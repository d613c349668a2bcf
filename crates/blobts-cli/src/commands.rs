use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blobts_codec::NameCodec;
use blobts_pipeline::generate_key;
use blobts_repo::{GitCli, VersionedRepo};
use blobts_store::{parse_batch_line, Store, StoreConfig};
use blobts_types::TimeInput;
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Add(args) => cmd_add(&config, args, &format),
        Command::Get(args) => cmd_get(&config, args, &format),
        Command::Keygen(args) => cmd_keygen(args),
        Command::DecodeName(args) => cmd_decode_name(&config, args, &format),
        Command::Check => cmd_check(&config),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(repo) = &cli.repo {
        config.path = repo.clone();
    }
    if let Some(compression) = &cli.compression {
        config.compression = Some(compression.clone());
    }
    if let Some(key_file) = &cli.key_file {
        config.key_file = Some(key_file.clone());
    }
    Ok(config)
}

fn open_store(config: &StoreConfig) -> anyhow::Result<Store<GitCli>> {
    let repo = match &config.remote {
        Some(url) if !config.path.exists() => GitCli::clone_from(url, &config.path)
            .with_context(|| format!("cloning {url} into {}", config.path.display()))?,
        _ => GitCli::open(&config.path)
            .with_context(|| format!("opening repository at {}", config.path.display()))?,
    };
    Ok(Store::open(repo, config.resolve()?)?)
}

/// Epoch seconds when the text is a number (including `inf` and `nan`),
/// free-form text otherwise. `2020` is therefore seconds, never a year.
fn parse_time(text: &str) -> TimeInput {
    match text.trim().parse::<f64>() {
        Ok(seconds) => TimeInput::Seconds(seconds),
        Err(_) => TimeInput::Text(text.to_string()),
    }
}

fn cmd_add(config: &StoreConfig, args: AddArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (payloads, times) = match &args.batch {
        Some(path) => read_batch(path)?,
        None => {
            let payload = match &args.file {
                Some(path) => std::fs::read(path)
                    .with_context(|| format!("reading payload {}", path.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf).context("reading payload from stdin")?;
                    buf
                }
            };
            let time = args.time.as_deref().map(parse_time).unwrap_or_default();
            (vec![payload], vec![time])
        }
    };

    let mut store = open_store(config)?;
    let added = store.add_many(&payloads, times)?;
    for (ts, payload) in added.iter().zip(&payloads) {
        match format {
            OutputFormat::Text => println!(
                "{} Added {} bytes at {}",
                "✓".green().bold(),
                payload.len(),
                ts.to_string().yellow()
            ),
            OutputFormat::Json => println!(
                "{}",
                json!({ "time_utc_ns": ts.to_string(), "len": payload.len() })
            ),
        }
    }
    Ok(())
}

fn read_batch(path: &Path) -> anyhow::Result<(Vec<Vec<u8>>, Vec<TimeInput>)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening batch {}", path.display()))?;
    let mut payloads = Vec::new();
    let mut times = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_batch_line(&line)
            .with_context(|| format!("{}:{}", path.display(), i + 1))?;
        payloads.push(entry.data);
        times.push(entry.time);
    }
    Ok((payloads, times))
}

fn cmd_get(config: &StoreConfig, args: GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let start = args.start.as_deref().map(parse_time);
    let end = args.end.as_deref().map(parse_time);
    if let Some(dir) = &args.out {
        std::fs::create_dir_all(dir)?;
    }

    let mut count = 0usize;
    for record in store.get(start, end, args.pull)? {
        let record = record?;
        if let Some(dir) = &args.out {
            let path = dir.join(format!("{:06}-{}.bin", count, record.time_utc_ns));
            std::fs::write(&path, &record.data)
                .with_context(|| format!("writing {}", path.display()))?;
        } else {
            match format {
                OutputFormat::Text => println!(
                    "{}\t{} bytes\t{}",
                    record.time_utc_ns.to_string().yellow(),
                    record.len(),
                    STANDARD.encode(&record.data)
                ),
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "time_utc_ns": record.time_utc_ns.to_string(),
                        "data": STANDARD.encode(&record.data),
                    })
                ),
            }
        }
        count += 1;
    }
    if let Some(dir) = &args.out {
        println!("{} Wrote {} records to {}", "✓".green().bold(), count, dir.display());
    }
    Ok(())
}

fn cmd_keygen(args: KeygenArgs) -> anyhow::Result<()> {
    let key = generate_key();
    match &args.out {
        Some(path) => {
            if path.exists() {
                anyhow::bail!("refusing to overwrite existing key file {}", path.display());
            }
            std::fs::write(path, format!("{}\n", key.to_text()))?;
            println!("{} Wrote new key to {}", "✓".green().bold(), path.display());
        }
        None => println!("{}", key.to_text()),
    }
    Ok(())
}

fn cmd_decode_name(
    config: &StoreConfig,
    args: DecodeNameArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let codec = NameCodec::new(config.encoding, config.nonce_bits);
    let mut failed = 0usize;
    for name in &args.names {
        let decoded = codec
            .parse_version(name)
            .and_then(|version| codec.parse_name(name).map(|ts| (version, ts)));
        match (decoded, format) {
            (Ok((version, ts)), OutputFormat::Text) => {
                println!("{}  {}  (format v{})", name, ts.to_string().yellow(), version)
            }
            (Ok((version, ts)), OutputFormat::Json) => println!(
                "{}",
                json!({ "name": name, "time_utc_ns": ts.to_string(), "version": version })
            ),
            (Err(e), OutputFormat::Text) => {
                failed += 1;
                println!("{}  {}", name, e.to_string().red())
            }
            (Err(e), OutputFormat::Json) => {
                failed += 1;
                println!("{}", json!({ "name": name, "error": e.to_string() }))
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} names could not be decoded", args.names.len());
    }
    Ok(())
}

fn cmd_check(config: &StoreConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let repo = store.repo();
    println!("{} Repository is usable", "✓".green().bold());
    println!("  Path: {}", store.path().display());
    println!("  Branch: {}", repo.active_branch()?.yellow());
    println!("  Remote: {}", repo.remote_name()?.unwrap_or_default().bold());
    println!(
        "  Compression: {}",
        store.pipeline().compression_id().unwrap_or("disabled").cyan()
    );
    let encryption = if store.pipeline().is_encrypted() { "enabled" } else { "disabled" };
    println!("  Encryption: {}", encryption.cyan());
    println!(
        "  Names: {} with {} random bits, suffix {}",
        store.codec().encoding(),
        store.codec().nonce_bits(),
        store.codec().current_suffix()?.cyan()
    );
    Ok(())
}
