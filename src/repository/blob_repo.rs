//! Object storage adapter (spec.md §4.1, C1), grounded in
//! `baebaebaebaebae-bae/bae-core/src/cloud_home/s3.rs`'s `aws_sdk_s3::Client`
//! construction and not-found classification.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::io::ReaderStream;

use crate::domain::image_target::ImageTarget;
use crate::domain::track::Track;

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("track audio file was not found")]
    MusicFileNotFound,

    #[error("image file was not found")]
    ImageFileNotFound,

    #[error("blob storage backend error: {0}")]
    Backend(String),
}

fn is_not_found(err: &impl std::fmt::Display) -> bool {
    let msg = err.to_string();
    msg.contains("NoSuchKey") || msg.contains("NotFound") || msg.contains("404")
}

#[derive(Clone)]
pub struct S3BlobRepository {
    client: Client,
    music_bucket: String,
    cover_bucket: String,
}

impl S3BlobRepository {
    pub async fn new(
        endpoint: Option<String>,
        region: String,
        access_key: String,
        secret_key: String,
        music_bucket: String,
        cover_bucket: String,
    ) -> Result<Self, BlobError> {
        let credentials = Credentials::new(&access_key, &secret_key, None, None, "tonearm-blob-store");

        let mut builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(credentials);

        if let Some(ref ep) = endpoint {
            builder = builder.endpoint_url(ep.trim_end_matches('/'));
        }

        let aws_config = builder.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config).force_path_style(true).build();
        let client = Client::from_conf(s3_config);

        Ok(Self { client, music_bucket, cover_bucket })
    }

    fn track_key(track: &Track) -> String {
        track.blob_key()
    }

    fn image_key(target: &ImageTarget) -> String {
        target.blob_key()
    }

    pub async fn put_track(&self, track: &Track, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        self.client
            .put_object()
            .bucket(&self.music_bucket)
            .key(Self::track_key(track))
            .content_type(content_type)
            .body(bytes.into())
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("put_track: {e}")))?;
        Ok(())
    }

    pub async fn put_image(&self, target: &ImageTarget, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        self.client
            .put_object()
            .bucket(&self.cover_bucket)
            .key(Self::image_key(target))
            .content_type(content_type)
            .body(bytes.into())
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("put_image: {e}")))?;
        Ok(())
    }

    pub async fn stat_track(&self, track: &Track) -> Result<u64, BlobError> {
        let resp = self
            .client
            .head_object()
            .bucket(&self.music_bucket)
            .key(Self::track_key(track))
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    BlobError::MusicFileNotFound
                } else {
                    BlobError::Backend(format!("stat_track: {e}"))
                }
            })?;

        Ok(resp.content_length().unwrap_or(0).max(0) as u64)
    }

    pub async fn get_image(&self, target: &ImageTarget) -> Result<Vec<u8>, BlobError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.cover_bucket)
            .key(Self::image_key(target))
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    BlobError::ImageFileNotFound
                } else {
                    BlobError::Backend(format!("get_image: {e}"))
                }
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Backend(format!("read image body: {e}")))?
            .into_bytes()
            .to_vec();
        Ok(bytes)
    }

    /// Lazy 8 KiB chunked byte stream over the half-open range `[start, end)`
    /// (spec.md §4.1, §9 "Concurrency for range streaming"). Non-restartable;
    /// drops the underlying connection once exhausted or the caller stops polling.
    pub async fn stream_track(
        &self,
        track: &Track,
        start: u64,
        end: u64,
    ) -> Result<impl Stream<Item = Result<Bytes, BlobError>>, BlobError> {
        let range = format!("bytes={start}-{}", end.saturating_sub(1));

        let resp = self
            .client
            .get_object()
            .bucket(&self.music_bucket)
            .key(Self::track_key(track))
            .range(range)
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    BlobError::MusicFileNotFound
                } else {
                    BlobError::Backend(format!("stream_track: {e}"))
                }
            })?;

        let async_read = ByteStream::into_async_read(resp.body);
        let stream = ReaderStream::with_capacity(async_read, CHUNK_SIZE);

        Ok(stream.map(|chunk| chunk.map_err(|e| BlobError::Backend(format!("stream_track body: {e}")))))
    }

    pub async fn delete_track(&self, track: &Track) -> Result<(), BlobError> {
        self.client
            .delete_object()
            .bucket(&self.music_bucket)
            .key(Self::track_key(track))
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("delete_track: {e}")))?;
        Ok(())
    }

    pub async fn delete_image(&self, target: &ImageTarget) -> Result<(), BlobError> {
        self.client
            .delete_object()
            .bucket(&self.cover_bucket)
            .key(Self::image_key(target))
            .send()
            .await
            .map_err(|e| BlobError::Backend(format!("delete_image: {e}")))?;
        Ok(())
    }
}
