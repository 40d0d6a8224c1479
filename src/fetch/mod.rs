//! Snapshot retrieval from local files, HTTP(S) URLs and S3 objects.

mod client;

pub use client::{BasicClient, HttpClient};

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::debug;

/// Where a snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Http(String),
    S3 { bucket: String, key: String },
}

impl Location {
    /// Classifies a location string by its scheme. Anything without a
    /// recognised scheme is a local path.
    pub fn parse(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Ok(Location::Http(location.to_string()));
        }
        if let Some(rest) = location.strip_prefix("s3://") {
            let Some((bucket, key)) = rest.split_once('/') else {
                bail!("S3 location '{location}' has no object key");
            };
            if bucket.is_empty() || key.is_empty() {
                bail!("S3 location '{location}' needs both a bucket and a key");
            }
            return Ok(Location::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        Ok(Location::Local(PathBuf::from(location)))
    }
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads the raw bytes behind `location`.
///
/// The S3 client is only required for `s3://` locations.
pub async fn load<C: HttpClient>(
    location: &Location,
    http: &C,
    s3: Option<&aws_sdk_s3::Client>,
) -> Result<Vec<u8>> {
    debug!(?location, "Loading snapshot");
    match location {
        Location::Local(path) => std::fs::read(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        Location::Http(url) => fetch_bytes(http, url)
            .await
            .with_context(|| format!("failed to download '{url}'")),
        Location::S3 { bucket, key } => {
            let Some(s3) = s3 else {
                bail!("no S3 client available for s3://{bucket}/{key}");
            };
            let object = s3
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .with_context(|| format!("failed to fetch s3://{bucket}/{key}"))?;
            let body = object.body.collect().await?;
            Ok(body.into_bytes().to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_parse_locations() {
        assert_eq!(
            Location::parse("https://example.com/bat.csv").unwrap(),
            Location::Http("https://example.com/bat.csv".into())
        );
        assert_eq!(
            Location::parse("s3://snapshots/2025/bat.csv").unwrap(),
            Location::S3 {
                bucket: "snapshots".into(),
                key: "2025/bat.csv".into()
            }
        );
        assert_eq!(
            Location::parse("data/bat.csv").unwrap(),
            Location::Local(PathBuf::from("data/bat.csv"))
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_s3() {
        assert!(Location::parse("s3://bucket-only").is_err());
        assert!(Location::parse("s3:///key").is_err());
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let path = format!("{}/auction_mii_test_load.csv", env::temp_dir().display());
        fs::write(&path, "model\nBMW M3\n").unwrap();

        let bytes = load(&Location::parse(&path).unwrap(), &BasicClient::new(), None)
            .await
            .unwrap();
        assert_eq!(bytes, b"model\nBMW M3\n");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_s3_without_client_fails() {
        let location = Location::parse("s3://bucket/key.csv").unwrap();
        assert!(load(&location, &BasicClient::new(), None).await.is_err());
    }
}
