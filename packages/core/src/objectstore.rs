//! MinIO/S3-compatible object storage client, built on `aws-sdk-s3` and
//! `aws-config` with path-style addressing against MinIO.

use crate::config::ObjectStoreConfig;
use crate::error::{PipelineError, Result};
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    AlreadyExists,
}

#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
}

impl ObjectStore {
    pub async fn connect(cfg: &ObjectStoreConfig) -> Result<Self> {
        let creds = Credentials::new(&cfg.access_key, &cfg.secret_key, None, None, "minio-static");
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(&cfg.endpoint)
            .credentials_provider(creds)
            .load()
            .await;

        let client = Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build(),
        );

        Ok(Self {
            client,
            bucket: cfg.bucket.clone(),
        })
    }

    /// Writes `bytes` to `key` only if it does not already exist. The
    /// existence check is a HEAD, not a GET, per spec §4.1's "skip if key
    /// exists" download contract.
    pub async fn put_if_absent(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        force: bool,
    ) -> Result<PutOutcome> {
        if !force && self.exists(key).await? {
            return Ok(PutOutcome::AlreadyExists);
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| PipelineError::Transient(format!("object put failed: {e}")))?;

        Ok(PutOutcome::Written)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| PipelineError::Transient(e.to_string()))?;
                Ok(Some(data.into_bytes()))
            }
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(PipelineError::Transient(format!("object get failed: {e}"))),
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(PipelineError::Transient(format!("object head failed: {e}"))),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| PipelineError::Transient(format!("object delete failed: {e}")))?;
        Ok(())
    }

    pub async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation.take() {
                req = req.continuation_token(token);
            }
            let output = req
                .send()
                .await
                .map_err(|e| PipelineError::Transient(format!("object list failed: {e}")))?;

            for obj in output.contents() {
                if let Some(k) = obj.key() {
                    keys.push(k.to_string());
                }
            }

            if output.is_truncated().unwrap_or(false) {
                continuation = output.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        keys.sort();
        Ok(keys)
    }
}

fn is_not_found<E>(err: &aws_sdk_s3::error::SdkError<E>) -> bool
where
    E: std::fmt::Debug,
{
    matches!(
        err,
        aws_sdk_s3::error::SdkError::ServiceError(service_err)
            if format!("{:?}", service_err.err()).contains("NotFound")
    )
}

/// `<edition_date>/<publication_slug>/raw/<sha256(url)>.<ext>` (spec §6).
pub fn raw_key(edition_date: &str, publication_slug: &str, url: &str, ext: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!(
        "{edition_date}/{publication_slug}/raw/{}.{ext}",
        hex::encode(digest)
    )
}

/// `auth/<publication_slug>/storage_state.json` (spec §6).
pub fn session_key(publication_slug: &str) -> String {
    format!("auth/{publication_slug}/storage_state.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_matches_layout() {
        let key = raw_key("2025-01-08", "smyth-county-news-messenger", "https://example.com/a.pdf", "pdf");
        assert!(key.starts_with("2025-01-08/smyth-county-news-messenger/raw/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn raw_key_is_deterministic() {
        let a = raw_key("2025-01-08", "pub", "https://example.com/a.pdf", "pdf");
        let b = raw_key("2025-01-08", "pub", "https://example.com/a.pdf", "pdf");
        assert_eq!(a, b);
    }

    #[test]
    fn session_key_is_per_publication() {
        assert_eq!(session_key("pub"), "auth/pub/storage_state.json");
    }
}
