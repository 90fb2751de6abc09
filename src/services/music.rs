//! Music Service (spec.md §4.6, C7): range planning, single/track creation,
//! cascading track/album deletion with empty-album reaping, and track-image
//! resolution via the owning album's cover.

use bytes::Bytes;
use chrono::NaiveDate;
use futures::Stream;
use sqlx::PgPool;

use crate::domain::album::Album;
use crate::domain::image_target::ImageTarget;
use crate::domain::track::Track;
use crate::repository::albums_repo::NewAlbum;
use crate::repository::blob_repo::BlobError;
use crate::repository::tracks_repo::NewTrack;
use crate::repository::{EntityKind, PgAlbumsRepository, PgTracksRepository, RepositoryError, S3BlobRepository};

use super::MusicServiceError;

/// Largest byte span a single `stream_track` response returns (spec.md
/// §4.6: "prevents a single response from saturating the connection").
const MAX_RANGE_BYTES: u64 = 1024 * 1024;

/// Any list of a parent's children the service needs "all of" (spec.md
/// §4.6/§4.7 "with a high limit").
const HIGH_LIMIT: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePlan {
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub content_length: u64,
}

/// Pure range-normalization algorithm (spec.md §4.6 "Range planning"),
/// factored out so it can be unit-tested without a blob backend.
pub fn plan_range(size: u64, start: Option<u64>, end: Option<u64>) -> Result<RangePlan, MusicServiceError> {
    let start = start.unwrap_or(0);
    if start >= size {
        return Err(MusicServiceError::InvalidStart { start, size });
    }

    let requested_end = end.unwrap_or(size - 1);
    let capped_end = start + MAX_RANGE_BYTES - 1;
    let end = requested_end.min(size - 1).min(capped_end);

    Ok(RangePlan { start, end, size, content_length: end - start + 1 })
}

pub struct NewSingle {
    pub name: String,
    pub artist_id: i32,
    pub genre_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub audio: Vec<u8>,
    pub audio_content_type: String,
    pub cover: Option<(Vec<u8>, String)>,
}

pub struct NewTrackOnAlbum {
    pub name: String,
    pub album_id: i32,
    pub artist_id: i32,
    pub genre_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub audio: Vec<u8>,
    pub audio_content_type: String,
}

pub struct NewAlbumWithCover {
    pub name: String,
    pub artist_id: i32,
    pub release_date: Option<NaiveDate>,
    pub cover: Option<(Vec<u8>, String)>,
}

pub struct MusicService {
    tracks: PgTracksRepository,
    albums: PgAlbumsRepository,
    blobs: S3BlobRepository,
}

impl MusicService {
    pub fn new(blobs: S3BlobRepository) -> Self {
        Self { tracks: PgTracksRepository::new(), albums: PgAlbumsRepository::new(), blobs }
    }

    /// Creates an Album from the single's fields, a Track under it, and
    /// uploads the audio (and optionally cover) blobs. No global rollback:
    /// if a later step fails, already-persisted rows remain and
    /// compensating cleanup is the caller's concern (spec.md §4.6 "Create
    /// single").
    pub async fn create_single(&self, pool: &PgPool, input: NewSingle) -> Result<(Album, Track), MusicServiceError> {
        let album = self
            .albums
            .create(pool, NewAlbum { name: input.name.clone(), artist_id: input.artist_id, release_date: input.release_date })
            .await?;

        let track = self
            .tracks
            .create(
                pool,
                NewTrack {
                    name: input.name,
                    album_id: album.id(),
                    artist_id: input.artist_id,
                    genre_id: input.genre_id,
                    release_date: input.release_date,
                },
            )
            .await?;

        self.blobs.put_track(&track, input.audio, &input.audio_content_type).await?;

        if let Some((bytes, content_type)) = input.cover {
            self.blobs.put_image(&ImageTarget::Album(album.id()), bytes, &content_type).await?;
        }

        Ok((album, track))
    }

    /// Creates a standalone Album (no track), with an optional cover upload
    /// (spec.md §6 "POST /album/"). Tracks are added to it afterwards via
    /// `create_track`.
    pub async fn create_album(&self, pool: &PgPool, input: NewAlbumWithCover) -> Result<Album, MusicServiceError> {
        let album = self
            .albums
            .create(pool, NewAlbum { name: input.name, artist_id: input.artist_id, release_date: input.release_date })
            .await?;

        if let Some((bytes, content_type)) = input.cover {
            self.blobs.put_image(&ImageTarget::Album(album.id()), bytes, &content_type).await?;
        }

        Ok(album)
    }

    /// Creates a Track under an already-existing Album and uploads its
    /// audio blob (spec.md §4.6 "Create track"). Album existence is
    /// enforced by `PgTracksRepository::create`'s referential validation.
    pub async fn create_track(&self, pool: &PgPool, input: NewTrackOnAlbum) -> Result<Track, MusicServiceError> {
        let track = self
            .tracks
            .create(
                pool,
                NewTrack {
                    name: input.name,
                    album_id: input.album_id,
                    artist_id: input.artist_id,
                    genre_id: input.genre_id,
                    release_date: input.release_date,
                },
            )
            .await?;

        self.blobs.put_track(&track, input.audio, &input.audio_content_type).await?;
        Ok(track)
    }

    /// Deletes a track's blob and row; reaps the parent album if this was
    /// its last track (spec.md §4.6 "Delete track", P5).
    pub async fn delete_track(&self, pool: &PgPool, track_id: i32) -> Result<(), MusicServiceError> {
        let track = self.tracks.get_by_id(pool, track_id).await?;

        match self.blobs.delete_track(&track).await {
            Ok(()) | Err(BlobError::MusicFileNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let remaining = self.tracks.count_by_album(pool, track.album_id()).await?;
        let is_last_track = remaining <= 1;

        if is_last_track {
            match self.blobs.delete_image(&ImageTarget::Album(track.album_id())).await {
                Ok(()) | Err(BlobError::ImageFileNotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.tracks.delete(pool, track_id).await?;

        if is_last_track {
            match self.albums.delete(pool, track.album_id()).await {
                Ok(()) | Err(RepositoryError::NotFound { kind: EntityKind::Album, .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Deletes every track under an album via the track-deletion path, then
    /// tolerantly cleans up the album's own cover and row (spec.md §4.6
    /// "Delete album"). The final album-delete tolerates `AlbumNotFound`,
    /// which the last track-deletion may have already triggered.
    pub async fn delete_album(&self, pool: &PgPool, album_id: i32) -> Result<(), MusicServiceError> {
        let tracks = self.tracks.list_by_album(pool, album_id, HIGH_LIMIT).await?;
        for track in tracks {
            self.delete_track(pool, track.id()).await?;
        }

        match self.blobs.delete_image(&ImageTarget::Album(album_id)).await {
            Ok(()) | Err(BlobError::ImageFileNotFound) => {}
            Err(e) => return Err(e.into()),
        }

        match self.albums.delete(pool, album_id).await {
            Ok(()) | Err(RepositoryError::NotFound { kind: EntityKind::Album, .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Plans the response range, then opens a lazy chunked byte stream over
    /// it (spec.md §4.6 "Range planning").
    pub async fn stream_track(
        &self,
        pool: &PgPool,
        track_id: i32,
        start: Option<u64>,
        end: Option<u64>,
    ) -> Result<(impl Stream<Item = Result<Bytes, BlobError>>, RangePlan), MusicServiceError> {
        let track = self.tracks.get_by_id(pool, track_id).await?;
        let size = self.blobs.stat_track(&track).await?;
        let plan = plan_range(size, start, end)?;

        let stream = self.blobs.stream_track(&track, plan.start, plan.end + 1).await?;
        Ok((stream, plan))
    }

    /// A track's "image" is its album's image (spec.md §4.6 "Track image
    /// operations", §9 "track cover" open question).
    pub async fn get_track_image(&self, pool: &PgPool, track_id: i32) -> Result<Vec<u8>, MusicServiceError> {
        let track = self.tracks.get_by_id(pool, track_id).await?;
        let bytes = self.blobs.get_image(&ImageTarget::Album(track.album_id())).await?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_range_defaults_to_full_file_when_small() {
        let plan = plan_range(10, None, None).unwrap();
        assert_eq!(plan, RangePlan { start: 0, end: 9, size: 10, content_length: 10 });
    }

    #[test]
    fn plan_range_honors_explicit_bounds() {
        let plan = plan_range(10, Some(2), Some(5)).unwrap();
        assert_eq!(plan, RangePlan { start: 2, end: 5, size: 10, content_length: 4 });
    }

    #[test]
    fn plan_range_clamps_end_past_file_size() {
        let plan = plan_range(10, Some(2), Some(999)).unwrap();
        assert_eq!(plan, RangePlan { start: 2, end: 9, size: 10, content_length: 8 });
    }

    #[test]
    fn plan_range_caps_at_one_mebibyte() {
        let size = 4 * 1024 * 1024;
        let plan = plan_range(size, Some(0), None).unwrap();
        assert_eq!(plan.content_length, MAX_RANGE_BYTES);
        assert_eq!(plan.end, MAX_RANGE_BYTES - 1);
    }

    #[test]
    fn plan_range_rejects_start_past_end() {
        let err = plan_range(10, Some(10), None).unwrap_err();
        assert!(matches!(err, MusicServiceError::InvalidStart { start: 10, size: 10 }));
    }
}
