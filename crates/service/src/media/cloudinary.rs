use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::{MediaError, MediaStore, StoredMedia};
use crate::wallpaper::upload::UploadFile;

const DEFAULT_ENDPOINT: &str = "https://api.cloudinary.com";

/// Signed uploads to the Cloudinary image API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    endpoint: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(cfg: &configs::CloudinaryConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| MediaError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cloud_name: cfg.cloud_name.clone(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            folder: cfg.folder.clone(),
        })
    }

    /// Point at another API host (tests use a local stand-in).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self) -> String {
        format!("{}/v1_1/{}/image/upload", self.endpoint, self.cloud_name)
    }

    /// Request signature: params sorted by key, joined as `k=v&k=v`, secret
    /// appended, SHA-256 hex digest.
    pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let joined = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
        let mut h = Sha256::new();
        h.update(joined.as_bytes());
        h.update(api_secret.as_bytes());
        hex::encode(h.finalize())
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn store(&self, file: &UploadFile) -> Result<StoredMedia, MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = Self::sign(&[("folder", self.folder.clone()), ("timestamp", timestamp.clone())], &self.api_secret);

        let mut part = reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(ct) = &file.content_type {
            part = part.mime_str(ct).map_err(|e| MediaError::Rejected(e.to_string()))?;
        }
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = match resp.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status.to_string(),
            };
            warn!(event = "cloudinary_upload_rejected", status = status.as_u16(), %detail);
            return Err(MediaError::Rejected(detail));
        }

        let body: UploadResponse = resp.json().await.map_err(|e| MediaError::Transport(e.to_string()))?;
        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| MediaError::Rejected("response carried no url".into()))?;
        info!(event = "cloudinary_upload_ok", public_id = %body.public_id, bytes = file.bytes.len());
        Ok(StoredMedia { url, public_id: body.public_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::{Multipart, Path}, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn cfg() -> configs::CloudinaryConfig {
        configs::CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "abcd".into(),
            folder: "wallpapers".into(),
            timeout_secs: 5,
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    fn png() -> UploadFile {
        UploadFile { file_name: "a.png".into(), content_type: Some("image/png".into()), bytes: vec![1, 2, 3] }
    }

    #[test]
    fn signature_matches_known_vector() {
        let sig = CloudinaryStore::sign(
            &[("timestamp", "1315060510".into()), ("folder", "wallpapers".into())],
            "abcd",
        );
        assert_eq!(sig, "0a876eb57bdec71059e6e37af68b7980c8360a5ed328692a74a197d267f7eee6");
    }

    #[tokio::test]
    async fn posts_signed_form_and_reads_secure_url() {
        async fn upload(Path(cloud): Path<String>, mut mp: Multipart) -> Json<Value> {
            let mut names = Vec::new();
            let mut file_len = 0;
            while let Some(field) = mp.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let data = field.bytes().await.unwrap();
                if name == "file" {
                    file_len = data.len();
                }
                names.push(name);
            }
            assert_eq!(cloud, "demo");
            assert!(names.iter().any(|n| n == "signature"));
            assert_eq!(file_len, 3);
            Json(json!({"public_id": "wallpapers/abc", "secure_url": "https://res.example/abc.png"}))
        }
        let base = spawn(Router::new().route("/v1_1/:cloud/image/upload", post(upload))).await;

        let store = CloudinaryStore::new(&cfg()).unwrap().with_endpoint(base);
        let stored = store.store(&png()).await.unwrap();
        assert_eq!(stored.url, "https://res.example/abc.png");
        assert_eq!(stored.public_id, "wallpapers/abc");
    }

    #[tokio::test]
    async fn api_error_is_rejected() {
        async fn deny() -> (StatusCode, Json<Value>) {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "Invalid Signature"}})))
        }
        let base = spawn(Router::new().route("/v1_1/:cloud/image/upload", post(deny))).await;

        let store = CloudinaryStore::new(&cfg()).unwrap().with_endpoint(base);
        let err = store.store(&png()).await.unwrap_err();
        assert!(matches!(err, MediaError::Rejected(ref m) if m == "Invalid Signature"));
    }
}
