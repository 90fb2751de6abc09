use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
#[error("Unknown activity event '{0}'. Expected one of 'play', 'skip', 'add_to_playlist'.")]
pub struct EventParseError(String);

/// One of the three events the telemetry channel records (spec.md §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Play,
    Skip,
    AddToPlaylist,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Play => "play",
            Event::Skip => "skip",
            Event::AddToPlaylist => "add_to_playlist",
        }
    }
}

impl TryFrom<&str> for Event {
    type Error = EventParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "play" => Ok(Event::Play),
            "skip" => Ok(Event::Skip),
            "add_to_playlist" => Ok(Event::AddToPlaylist),
            other => Err(EventParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Event {
    type Error = EventParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Event::try_from(value.as_str())
    }
}

/// An append-only telemetry row (spec.md §3 "ActivityEvent").
#[derive(Clone, Debug)]
pub struct ActivityEvent {
    id: i64,
    user_id: i32,
    track_id: i32,
    event: Event,
    time: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(id: i64, user_id: i32, track_id: i32, event: Event, time: DateTime<Utc>) -> Self {
        Self { id, user_id, track_id, event, time }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn track_id(&self) -> i32 {
        self.track_id
    }

    pub fn event(&self) -> Event {
        self.event
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_events() {
        assert_eq!(Event::try_from("play").unwrap(), Event::Play);
        assert_eq!(Event::try_from("skip").unwrap(), Event::Skip);
        assert_eq!(Event::try_from("add_to_playlist").unwrap(), Event::AddToPlaylist);
    }

    #[test]
    fn rejects_unknown_event() {
        assert!(Event::try_from("rewind").is_err());
    }
}
