//! Request parsing shared across handler modules: bearer-token extractors
//! (spec.md §4.5 "token validity is checked on every protected endpoint")
//! and a small multipart-field helper for the upload endpoints
//! (register-with-cover, track/single, track/file).

pub mod account;
pub mod activity;
pub mod admin;
pub mod album;
pub mod genre;
pub mod misc;
pub mod playlist;
pub mod queue;
pub mod track;

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Multipart};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::Claims;

use super::error::ApiError;
use super::AppState;

/// A verified bearer token's claims. Rejects with 401 if the header is
/// absent, malformed, or the token fails verification.
pub struct RequireAuth(pub Claims);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = extract_claims(parts, state)?.ok_or(ApiError::Unauthorized)?;
        Ok(RequireAuth(claims))
    }
}

/// Claims if a valid bearer token is present, `None` otherwise — never
/// rejects (spec.md §4.5 mode 3, "unset means the caller if any").
pub struct OptionalAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(extract_claims(parts, state).unwrap_or(None)))
    }
}

fn extract_claims(parts: &Parts, state: &AppState) -> Result<Option<Claims>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header.to_str().map_err(|_| ApiError::Unauthorized)?;
    let Some(token) = header.strip_prefix("Bearer ") else {
        return Ok(None);
    };
    Ok(Some(state.tokens.verify(token)?))
}

pub enum FieldValue {
    Text(String),
    File { bytes: Vec<u8>, content_type: String },
}

/// Named multipart fields, collected up front so handlers can pull fields
/// out of order (form fields don't arrive in a fixed sequence).
pub struct MultipartFields(HashMap<String, FieldValue>);

impl MultipartFields {
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::BadRequest(e.to_string()))? {
            let name = field.name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let is_file = field.file_name().is_some();

            if is_file {
                let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?.to_vec();
                fields.insert(name, FieldValue::File { bytes, content_type });
            } else {
                let text = field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                fields.insert(name, FieldValue::Text(text));
            }
        }

        Ok(Self(fields))
    }

    pub fn text(&self, name: &str) -> Result<String, ApiError> {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => Ok(s.clone()),
            _ => Err(ApiError::Unprocessable(format!("missing required field '{name}'"))),
        }
    }

    pub fn text_opt(&self, name: &str) -> Option<String> {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn file(&self, name: &str) -> Result<(Vec<u8>, String), ApiError> {
        match self.0.get(name) {
            Some(FieldValue::File { bytes, content_type }) => Ok((bytes.clone(), content_type.clone())),
            _ => Err(ApiError::Unprocessable(format!("missing required file field '{name}'"))),
        }
    }

    pub fn file_opt(&self, name: &str) -> Option<(Vec<u8>, String)> {
        match self.0.get(name) {
            Some(FieldValue::File { bytes, content_type }) => Some((bytes.clone(), content_type.clone())),
            _ => None,
        }
    }
}

/// Parses `Range: bytes=<s?>-<e?>` (spec.md §4.8). Non-`bytes` units and
/// malformed ranges are rejected with 400; an absent header yields
/// `(None, None)` (full-object default, planned downstream in §4.6).
pub fn parse_range_header(value: Option<&str>) -> Result<(Option<u64>, Option<u64>), ApiError> {
    let Some(value) = value else {
        return Ok((None, None));
    };

    let rest = value.strip_prefix("bytes=").ok_or_else(|| ApiError::BadRequest("Range unit must be 'bytes'".into()))?;
    let (start_str, end_str) =
        rest.split_once('-').ok_or_else(|| ApiError::BadRequest("malformed Range header".into()))?;

    let start = if start_str.is_empty() {
        None
    } else {
        Some(start_str.parse::<u64>().map_err(|_| ApiError::BadRequest("malformed Range start".into()))?)
    };
    let end = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse::<u64>().map_err(|_| ApiError::BadRequest("malformed Range end".into()))?)
    };

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_range_absent_is_full_object() {
        assert_eq!(parse_range_header(None).unwrap(), (None, None));
    }

    #[test]
    fn parse_range_parses_both_bounds() {
        assert_eq!(parse_range_header(Some("bytes=2-5")).unwrap(), (Some(2), Some(5)));
    }

    #[test]
    fn parse_range_open_ended() {
        assert_eq!(parse_range_header(Some("bytes=2-")).unwrap(), (Some(2), None));
    }

    #[test]
    fn parse_range_rejects_non_bytes_unit() {
        assert!(parse_range_header(Some("frames=2-5")).is_err());
    }

    #[test]
    fn parse_range_rejects_malformed() {
        assert!(parse_range_header(Some("bytes=abc")).is_err());
    }
}
