//! Publishing scored tables: local CSV files plus a pluggable upload sink.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{error, info};

use crate::analyzers::types::ScoredAggregate;
use crate::output::write_table;
use crate::records::ProcessingContext;

pub const LATEST_FILE: &str = "mii_results_latest.csv";

/// Destination for published artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;
}

/// Uploads artifacts to an S3 bucket, optionally gzip-compressed.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    gzip: bool,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            gzip,
        }
    }
}

/// Gzip-compresses `body`.
pub fn gzip_bytes(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl ArtifactSink for S3Sink {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let (body, key, encoding) = if self.gzip {
            (Bytes::from(gzip_bytes(&body)?), format!("{key}.gz"), Some("gzip"))
        } else {
            (body, key.to_string(), None)
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .set_content_encoding(encoding.map(str::to_string))
            .send()
            .await?;

        info!(bucket = %self.bucket, key = %key, "Uploaded artifact");
        Ok(())
    }
}

/// Discards everything; used when no bucket is configured.
pub struct NoopSink;

#[async_trait]
impl ArtifactSink for NoopSink {
    async fn put(&self, _key: &str, _body: Bytes, _content_type: &str) -> Result<()> {
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Default)]
pub struct MemorySink {
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemorySink {
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Bytes>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<()> {
        self.lock().insert(key.to_string(), body);
        Ok(())
    }
}

/// Local paths written by [`publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub dated: String,
    pub latest: String,
}

/// Writes the dated and latest CSVs under `out_dir`, then uploads both.
///
/// Local writes must succeed; upload failures are logged and skipped.
#[tracing::instrument(skip_all, fields(rows = rows.len(), out_dir = %out_dir))]
pub async fn publish(
    rows: &[ScoredAggregate],
    out_dir: &str,
    sink: &dyn ArtifactSink,
    ctx: &ProcessingContext,
) -> Result<Published> {
    std::fs::create_dir_all(out_dir)?;

    let dated_name = format!("mii_results_{}.csv", ctx.now.format("%Y%m%d_%H%M"));
    let dated = Path::new(out_dir).join(&dated_name).display().to_string();
    let latest = Path::new(out_dir).join(LATEST_FILE).display().to_string();

    write_table(&dated, rows)?;
    write_table(&latest, rows)?;
    info!(dated = %dated, latest = %latest, "Wrote scored table");

    for (key, path) in [(dated_name.as_str(), &dated), (LATEST_FILE, &latest)] {
        let body = Bytes::from(std::fs::read(path)?);
        if let Err(e) = sink.put(key, body, "text/csv").await {
            error!(key, error = %e, "Artifact upload failed");
        }
    }

    Ok(Published { dated, latest })
}
