//! stripemeta inspector
//!
//! Reads one object's metadata from a set of directory-backed disks and
//! reports what each disk holds, whether the set reaches read quorum, and
//! the agreed records in logical block order.
//!
//! ```text
//! stripemeta --disk /mnt/d1 --disk /mnt/d2 --disk /mnt/d3 \
//!     --bucket photos --object 2021/a.jpg --mode full
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stripemeta::config::{MetaConfig, DEFAULT_METADATA_FILE};
use stripemeta::xl::{
    encode_metadata, is_valid_distribution, reduce_read_quorum_errs, shuffle_parts_metadata,
    MetadataReader, ObjectQuorum,
};
use stripemeta::{disk_count, DiskError, DiskHandle, LocalDisk};

// =============================================================================
// CLI Arguments
// =============================================================================

/// What to read from each disk
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Whole document, reordered into logical block order
    Full,
    /// Stat and user metadata only
    Stat,
    /// Parts list only
    Parts,
}

/// Inspect erasure metadata across a disk set
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Disk root directories, in physical disk order
    #[arg(long = "disk", env = "STRIPEMETA_DISKS", value_delimiter = ',', required = true)]
    disks: Vec<PathBuf>,

    /// Bucket name
    #[arg(long)]
    bucket: String,

    /// Object name
    #[arg(long)]
    object: String,

    /// Read quorum; derived from the object's data shard count when omitted
    #[arg(long, env = "STRIPEMETA_READ_QUORUM")]
    read_quorum: Option<usize>,

    /// What to read
    #[arg(long, value_enum, default_value = "full")]
    mode: Mode,

    /// Metadata document file name
    #[arg(long, env = "STRIPEMETA_METADATA_FILE", default_value = DEFAULT_METADATA_FILE)]
    metadata_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = MetaConfig {
        metadata_file: args.metadata_file.clone(),
        ..Default::default()
    };
    config.validate()?;

    let disks = open_disks(&args.disks);
    info!(
        "Inspecting {}/{} on {} disks ({} online)",
        args.bucket,
        args.object,
        disks.len(),
        disk_count(&disks)
    );

    let reader = MetadataReader::new(config);
    let report = match args.mode {
        Mode::Full => inspect_full(&reader, &disks, &args).await?,
        Mode::Stat => inspect_stat(&reader, &disks, &args).await?,
        Mode::Parts => inspect_parts(&reader, &disks, &args).await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Missing directories become absent disks
fn open_disks(roots: &[PathBuf]) -> Vec<DiskHandle> {
    roots
        .iter()
        .map(|root| {
            if root.is_dir() {
                let disk: DiskHandle = Some(Arc::new(LocalDisk::new(root)));
                disk
            } else {
                warn!("Disk {} is not a directory, treating as offline", root.display());
                None
            }
        })
        .collect()
}

fn slot_report(err: &Option<DiskError>) -> Value {
    match err {
        None => json!("ok"),
        Some(e) => json!(e.to_string()),
    }
}

/// Quorum to check against when none was given
fn fallback_quorum(disks: usize) -> usize {
    disks / 2 + 1
}

// =============================================================================
// Inspection Modes
// =============================================================================

async fn inspect_full(
    reader: &MetadataReader,
    disks: &[DiskHandle],
    args: &Args,
) -> anyhow::Result<Value> {
    let (records, errs) = reader
        .read_all_metadata(disks, &args.bucket, &args.object)
        .await;

    let reference = records
        .iter()
        .zip(&errs)
        .find(|(_, err)| err.is_none())
        .map(|(record, _)| record.clone());

    let quorum = args.read_quorum.unwrap_or_else(|| {
        reference
            .as_ref()
            .map(|r| ObjectQuorum::from_erasure(&r.erasure).read)
            .filter(|&q| q > 0)
            .unwrap_or_else(|| fallback_quorum(disks.len()))
    });
    let per_disk: Vec<Value> = errs.iter().map(slot_report).collect();

    if let Err(e) = reduce_read_quorum_errs(&errs, &[], quorum) {
        return Ok(json!({
            "disks": per_disk,
            "readQuorum": quorum,
            "error": e.to_string(),
        }));
    }

    let Some(reference) = reference else {
        bail!("read quorum met without any readable disk");
    };
    let distribution = reference.erasure.distribution();
    if let Some(d) = distribution {
        if !is_valid_distribution(d, records.len()) {
            bail!(
                "distribution {:?} is not a permutation of 1..={}",
                d,
                records.len()
            );
        }
    }

    let ordered = shuffle_parts_metadata(records, distribution);
    let ordered_errs = stripemeta::xl::shuffle(errs, distribution);
    let mut blocks = Vec::with_capacity(ordered.len());
    for (record, err) in ordered.iter().zip(&ordered_errs) {
        blocks.push(match err {
            None => {
                let doc = encode_metadata(record).context("encoding metadata record")?;
                serde_json::from_slice::<Value>(&doc)?
            }
            Some(_) => Value::Null,
        });
    }

    Ok(json!({
        "disks": per_disk,
        "readQuorum": quorum,
        "blocks": blocks,
    }))
}

async fn inspect_stat(
    reader: &MetadataReader,
    disks: &[DiskHandle],
    args: &Args,
) -> anyhow::Result<Value> {
    let (stats, errs) = reader.read_all_stat(disks, &args.bucket, &args.object).await;
    let quorum = args.read_quorum.unwrap_or_else(|| fallback_quorum(disks.len()));

    let per_disk: Vec<Value> = stats
        .iter()
        .zip(&errs)
        .map(|(s, err)| match err {
            None => json!({
                "modTime": s.stat.mod_time.to_rfc3339(),
                "size": s.stat.size,
                "meta": s.meta,
            }),
            Some(_) => slot_report(err),
        })
        .collect();

    Ok(json!({
        "disks": per_disk,
        "readQuorum": quorum,
        "quorum": quorum_report(&errs, quorum),
    }))
}

async fn inspect_parts(
    reader: &MetadataReader,
    disks: &[DiskHandle],
    args: &Args,
) -> anyhow::Result<Value> {
    let (parts, errs) = reader.read_all_parts(disks, &args.bucket, &args.object).await;
    let quorum = args.read_quorum.unwrap_or_else(|| fallback_quorum(disks.len()));

    let per_disk: Vec<Value> = parts
        .iter()
        .zip(&errs)
        .map(|(parts, err)| match err {
            None => Value::Array(
                parts
                    .iter()
                    .map(|p| {
                        json!({
                            "number": p.number,
                            "name": p.name,
                            "etag": p.etag,
                            "size": p.size,
                        })
                    })
                    .collect(),
            ),
            Some(_) => slot_report(err),
        })
        .collect();

    Ok(json!({
        "disks": per_disk,
        "readQuorum": quorum,
        "quorum": quorum_report(&errs, quorum),
    }))
}

fn quorum_report(errs: &[Option<DiskError>], quorum: usize) -> Value {
    match reduce_read_quorum_errs(errs, &[], quorum) {
        Ok(()) => json!("ok"),
        Err(e) => json!(e.to_string()),
    }
}
