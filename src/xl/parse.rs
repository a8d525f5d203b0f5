//! Metadata Document Parser
//!
//! Decodes the persisted per-object metadata document into a
//! [`MetadataRecord`] and encodes records back. The document is JSON with
//! the following addressable fields:
//!
//! ```text
//! version, format
//! stat.modTime (RFC3339), stat.size
//! erasure.{algorithm, data, parity, blockSize, index, distribution[]}
//! erasure.checksum[] { algorithm, hash (hex), name }
//! parts[] { number, name, etag, size }
//! minio.release
//! meta { string: string }
//! ```
//!
//! Absent fields decode to their zero value. The `(version, format)` pair is
//! checked on its own before any other field is looked at; a document with
//! an unrecognized pair is rejected as [`DiskError::CorruptedFormat`].

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::meta::{BitrotAlgorithm, ChecksumInfo, ErasureInfo, MetadataRecord, PartInfo, StatInfo};
use crate::config::MetaConfig;
use crate::error::{DiskError, Result};

// =============================================================================
// Document Schema
// =============================================================================

/// Treat an explicit `null` the same as an absent field
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read any JSON scalar as text: strings as-is, `null` as empty, numbers
/// and booleans in their JSON spelling
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormatProbe {
    #[serde(deserialize_with = "scalar_text")]
    version: String,
    #[serde(deserialize_with = "scalar_text")]
    format: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StatDoc {
    #[serde(rename = "modTime", deserialize_with = "nullable")]
    mod_time: String,
    #[serde(deserialize_with = "nullable")]
    size: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ChecksumDoc {
    #[serde(deserialize_with = "nullable")]
    algorithm: String,
    #[serde(deserialize_with = "nullable")]
    hash: String,
    #[serde(deserialize_with = "nullable")]
    name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ErasureDoc {
    #[serde(deserialize_with = "nullable")]
    algorithm: String,
    #[serde(deserialize_with = "nullable")]
    data: usize,
    #[serde(deserialize_with = "nullable")]
    parity: usize,
    #[serde(rename = "blockSize", deserialize_with = "nullable")]
    block_size: i64,
    #[serde(deserialize_with = "nullable")]
    index: usize,
    #[serde(deserialize_with = "nullable")]
    distribution: Vec<usize>,
    #[serde(
        rename = "checksum",
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    checksums: Vec<ChecksumDoc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PartDoc {
    #[serde(deserialize_with = "nullable")]
    number: usize,
    #[serde(deserialize_with = "nullable")]
    name: String,
    #[serde(deserialize_with = "nullable")]
    etag: String,
    #[serde(deserialize_with = "nullable")]
    size: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ReleaseDoc {
    #[serde(deserialize_with = "nullable")]
    release: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct MetaDoc {
    #[serde(deserialize_with = "scalar_text")]
    version: String,
    #[serde(deserialize_with = "scalar_text")]
    format: String,
    #[serde(deserialize_with = "nullable")]
    stat: StatDoc,
    #[serde(deserialize_with = "nullable")]
    erasure: ErasureDoc,
    #[serde(deserialize_with = "nullable")]
    minio: ReleaseDoc,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "HashMap::is_empty")]
    meta: HashMap<String, String>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    parts: Vec<PartDoc>,
}

/// The stat-only projection of the document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatView {
    #[serde(deserialize_with = "nullable")]
    stat: StatDoc,
    #[serde(deserialize_with = "nullable")]
    meta: HashMap<String, String>,
}

/// The parts-only projection of the document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartsView {
    #[serde(deserialize_with = "nullable")]
    parts: Vec<PartDoc>,
}

fn from_slice<'a, T: Deserialize<'a>>(buf: &'a [u8]) -> std::result::Result<T, DiskError> {
    serde_json::from_slice(buf).map_err(|e| DiskError::MalformedDocument(e.to_string()))
}

// =============================================================================
// Field Conversion
// =============================================================================

fn parse_mod_time(text: &str) -> std::result::Result<DateTime<Utc>, DiskError> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DiskError::MalformedTimestamp(text.to_string()))
}

fn stat_from_doc(doc: StatDoc) -> std::result::Result<StatInfo, DiskError> {
    Ok(StatInfo {
        mod_time: parse_mod_time(&doc.mod_time)?,
        size: doc.size,
    })
}

fn checksum_from_doc(doc: ChecksumDoc) -> std::result::Result<ChecksumInfo, DiskError> {
    let algorithm: BitrotAlgorithm = doc.algorithm.parse()?;
    let hash = hex::decode(&doc.hash).map_err(|e| DiskError::MalformedHash(e.to_string()))?;
    Ok(ChecksumInfo {
        name: doc.name,
        algorithm,
        hash,
    })
}

fn erasure_from_doc(doc: ErasureDoc) -> std::result::Result<ErasureInfo, DiskError> {
    let checksums = doc
        .checksums
        .into_iter()
        .map(checksum_from_doc)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ErasureInfo {
        algorithm: doc.algorithm,
        data_blocks: doc.data,
        parity_blocks: doc.parity,
        block_size: doc.block_size,
        index: doc.index,
        distribution: doc.distribution,
        checksums,
    })
}

fn part_from_doc(doc: PartDoc) -> PartInfo {
    PartInfo {
        number: doc.number,
        name: doc.name,
        etag: doc.etag,
        size: doc.size,
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Check only the document's `(version, format)` pair.
///
/// Cheap sanity check for callers that do not need the full record.
pub fn check_format(buf: &[u8], config: &MetaConfig) -> std::result::Result<(), DiskError> {
    let probe: FormatProbe = from_slice(buf)?;
    if config.is_valid(&probe.version, &probe.format) {
        Ok(())
    } else {
        Err(DiskError::CorruptedFormat)
    }
}

/// Decode a full metadata document.
pub fn parse_metadata(
    buf: &[u8],
    config: &MetaConfig,
) -> std::result::Result<MetadataRecord, DiskError> {
    check_format(buf, config)?;

    let doc: MetaDoc = from_slice(buf)?;
    let stat = stat_from_doc(doc.stat)?;
    let erasure = erasure_from_doc(doc.erasure)?;

    Ok(MetadataRecord {
        version: doc.version,
        format: doc.format,
        stat,
        erasure,
        parts: doc.parts.into_iter().map(part_from_doc).collect(),
        meta: doc.meta,
        release: doc.minio.release,
    })
}

/// Decode only `stat` and the user metadata map.
pub fn parse_stat(
    buf: &[u8],
    config: &MetaConfig,
) -> std::result::Result<(StatInfo, HashMap<String, String>), DiskError> {
    check_format(buf, config)?;

    let view: StatView = from_slice(buf)?;
    Ok((stat_from_doc(view.stat)?, view.meta))
}

/// Decode only the `parts` list.
pub fn parse_parts(
    buf: &[u8],
    config: &MetaConfig,
) -> std::result::Result<Vec<PartInfo>, DiskError> {
    check_format(buf, config)?;

    let view: PartsView = from_slice(buf)?;
    Ok(view.parts.into_iter().map(part_from_doc).collect())
}

/// Encode a record as the persisted metadata document.
pub fn encode_metadata(record: &MetadataRecord) -> Result<Vec<u8>> {
    let erasure = &record.erasure;
    let doc = MetaDoc {
        version: record.version.clone(),
        format: record.format.clone(),
        stat: StatDoc {
            mod_time: record
                .stat
                .mod_time
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            size: record.stat.size,
        },
        erasure: ErasureDoc {
            algorithm: erasure.algorithm.clone(),
            data: erasure.data_blocks,
            parity: erasure.parity_blocks,
            block_size: erasure.block_size,
            index: erasure.index,
            distribution: erasure.distribution.clone(),
            checksums: erasure
                .checksums
                .iter()
                .map(|c| ChecksumDoc {
                    algorithm: c.algorithm.as_str().to_string(),
                    hash: hex::encode(&c.hash),
                    name: c.name.clone(),
                })
                .collect(),
        },
        minio: ReleaseDoc {
            release: record.release.clone(),
        },
        meta: record.meta.clone(),
        parts: record
            .parts
            .iter()
            .map(|p| PartDoc {
                number: p.number,
                name: p.name.clone(),
                etag: p.etag.clone(),
                size: p.size,
            })
            .collect(),
    };

    Ok(serde_json::to_vec(&doc)?)
}
