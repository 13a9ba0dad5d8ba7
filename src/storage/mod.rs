//! Object storage for rendered certificates.
//!
//! The storage service is an external collaborator reached over HTTP; this
//! module only covers the two calls the workflow needs: upload bytes and
//! mint a time-limited signed download URL. Both are behind a capability
//! trait so tests can inject an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Signed URLs are always issued with a 1-hour expiry.
pub const SIGNED_URL_EXPIRY_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage service returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    async fn signed_url(&self, path: &str, expires_in: u64) -> Result<String, StorageError>;
}

/// Bucket path for a certificate issued at `issued_at`:
/// `certificates/{yyyy}/{mm}/{dd}/{certificateNumber}.pdf`.
pub fn object_path(certificate_number: &str, issued_at: DateTime<Utc>) -> String {
    format!(
        "certificates/{}/{:02}/{:02}/{}.pdf",
        issued_at.year(),
        issued_at.month(),
        issued_at.day(),
        certificate_number
    )
}

/// Supabase Storage client authenticated with the service-role key.
pub struct SupabaseStorage {
    base_url: String,
    bucket: String,
    service_key: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, bucket: &str, service_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("Cache-Control", "3600")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upstream { status, body });
        }
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: u64) -> Result<String, StorageError> {
        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, path
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .json(&json!({ "expiresIn": expires_in }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upstream { status, body });
        }

        let signed: SignedUrlResponse = response.json().await?;
        // The service answers with a path relative to the storage root.
        Ok(format!(
            "{}/storage/v1{}",
            self.base_url,
            signed.signed_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn object_path_follows_bucket_layout() {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        assert_eq!(
            object_path("CERT-20240115-0001", issued_at),
            "certificates/2024/01/15/CERT-20240115-0001.pdf"
        );
    }

    #[test]
    fn object_path_pads_month_and_day() {
        let issued_at = Utc.with_ymd_and_hms(2025, 12, 3, 9, 0, 0).unwrap();
        assert_eq!(
            object_path("CERT-20251203-0042", issued_at),
            "certificates/2025/12/03/CERT-20251203-0042.pdf"
        );
    }
}
