//! `GET /misc/ping` — unauthenticated liveness probe, grounded in
//! `original_source/backend/api/routers/misc.py`'s trivial `ping` endpoint.

pub async fn ping() -> &'static str {
    "pong"
}
