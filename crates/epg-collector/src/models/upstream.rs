//! Payloads returned by the upstream content API
//!
//! Upstream omits fields freely and sometimes sends `null`; both decode to
//! empty strings and zeros.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<ChannelData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpgResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub programs: Vec<ProgramData>,
}

/// One scheduled program; times are epoch seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub age_rating: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub poster_url: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_decode_to_defaults() {
        let payload = r#"{
            "status": "ok",
            "channels": [
                {"id": "101", "name": "First", "icon": null, "urls": ["https://cdn/1.m3u8"]},
                {"id": "102", "name": "Second"}
            ]
        }"#;

        let response: PlaylistResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.channels.len(), 2);
        assert_eq!(response.channels[0].icon, "");
        assert_eq!(response.channels[0].urls, vec!["https://cdn/1.m3u8".to_string()]);
        assert_eq!(response.channels[1].category, "");
        assert!(response.channels[1].urls.is_empty());
    }

    #[test]
    fn program_fields_decode_from_epoch_seconds() {
        let payload = r#"{
            "status": "ok",
            "programs": [
                {"id": "9", "title": "Film", "start_time": 1000, "end_time": 1900,
                 "year": 1999, "rating": 8.1, "genre": null}
            ]
        }"#;

        let response: EpgResponse = serde_json::from_str(payload).unwrap();
        let program = &response.programs[0];
        assert_eq!(program.start_time, 1000);
        assert_eq!(program.end_time, 1900);
        assert_eq!(program.year, 1999);
        assert_eq!(program.genre, "");
        assert_eq!(program.age_rating, "");
    }

    #[test]
    fn empty_object_is_an_empty_playlist() {
        let response: PlaylistResponse = serde_json::from_str("{}").unwrap();
        assert!(response.channels.is_empty());
    }
}
