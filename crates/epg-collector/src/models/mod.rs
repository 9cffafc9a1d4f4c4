use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod collection;
pub mod upstream;

pub use collection::*;
pub use upstream::*;

/// Transport type recorded for every collected stream URL
pub const STREAM_TYPE_HLS: &str = "hls";

/// A channel from the upstream lineup, keyed by its upstream `external_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub icon_url: String,
    pub category: String,
    pub stream_urls: Vec<StreamUrl>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamUrl {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub url: String,
    /// Positional label, `stream_1` for the first fetched URL
    pub quality: String,
    pub stream_type: String,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpgProgram {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub category: String,
    pub genre: String,
    pub age_rating: String,
    pub year: i32,
    pub rating: f32,
    pub poster_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stream URL to persist for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUrlRequest {
    pub url: String,
    pub quality: String,
    pub stream_type: String,
    pub position: i32,
}

impl StreamUrlRequest {
    /// Label URLs `stream_1..stream_N` in fetch order, all of type `hls`
    pub fn positional(urls: &[String]) -> Vec<Self> {
        urls.iter()
            .enumerate()
            .map(|(index, url)| {
                let position = index as i32 + 1;
                Self {
                    url: url.clone(),
                    quality: stream_label(position),
                    stream_type: STREAM_TYPE_HLS.to_string(),
                    position,
                }
            })
            .collect()
    }
}

pub fn stream_label(position: i32) -> String {
    format!("stream_{position}")
}

/// Channel fields written on create and overwritten on update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelUpsertRequest {
    pub external_id: String,
    pub name: String,
    pub icon_url: String,
    pub category: String,
    pub stream_urls: Vec<StreamUrlRequest>,
}

impl From<&ChannelData> for ChannelUpsertRequest {
    fn from(data: &ChannelData) -> Self {
        Self {
            external_id: data.id.clone(),
            name: data.name.clone(),
            icon_url: data.icon.clone(),
            category: data.category.clone(),
            stream_urls: StreamUrlRequest::positional(&data.urls),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpgProgramCreateRequest {
    pub channel_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub category: String,
    pub genre: String,
    pub age_rating: String,
    pub year: i32,
    pub rating: f32,
    pub poster_url: String,
}

impl EpgProgramCreateRequest {
    /// Build a program row for `channel_id`, or `None` when a timestamp is out of range
    pub fn from_program_data(channel_id: Uuid, data: &ProgramData) -> Option<Self> {
        let start_time = DateTime::from_timestamp(data.start_time, 0)?;
        let end_time = DateTime::from_timestamp(data.end_time, 0)?;

        Some(Self {
            channel_id,
            external_id: data.id.clone(),
            title: data.title.clone(),
            description: data.description.clone(),
            start_time,
            end_time,
            duration_minutes: duration_minutes(data.start_time, data.end_time),
            category: data.category.clone(),
            genre: data.genre.clone(),
            age_rating: data.age_rating.clone(),
            year: data.year,
            rating: data.rating,
            poster_url: data.poster_url.clone(),
        })
    }
}

/// Whole minutes between two epoch-second instants, truncated toward zero
pub fn duration_minutes(start: i64, end: i64) -> i32 {
    let minutes = end.saturating_sub(start) / 60;
    minutes.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Parameters for one per-channel EPG fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgRequest {
    pub channel_external_id: String,
    pub tz_offset: i32,
}

impl EpgRequest {
    pub fn new<S: Into<String>>(channel_external_id: S, tz_offset: i32) -> Self {
        Self {
            channel_external_id: channel_external_id.into(),
            tz_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1000, 1900, 15)]
    #[case(0, 59, 0)]
    #[case(0, 3600, 60)]
    #[case(100, 219, 1)]
    fn duration_truncates_to_whole_minutes(
        #[case] start: i64,
        #[case] end: i64,
        #[case] expected: i32,
    ) {
        assert_eq!(duration_minutes(start, end), expected);
    }

    #[test]
    fn stream_urls_are_labelled_in_fetch_order() {
        let urls = vec![
            "https://cdn/a.m3u8".to_string(),
            "https://cdn/b.m3u8".to_string(),
            "https://cdn/c.m3u8".to_string(),
        ];
        let labelled = StreamUrlRequest::positional(&urls);

        assert_eq!(labelled.len(), 3);
        for (index, entry) in labelled.iter().enumerate() {
            assert_eq!(entry.url, urls[index]);
            assert_eq!(entry.quality, format!("stream_{}", index + 1));
            assert_eq!(entry.stream_type, "hls");
            assert_eq!(entry.position, index as i32 + 1);
        }
    }

    #[test]
    fn program_request_carries_derived_fields() {
        let channel_id = Uuid::new_v4();
        let data = ProgramData {
            id: "p1".to_string(),
            title: "News".to_string(),
            start_time: 1000,
            end_time: 1900,
            rating: 7.5,
            ..Default::default()
        };

        let request = EpgProgramCreateRequest::from_program_data(channel_id, &data).unwrap();
        assert_eq!(request.channel_id, channel_id);
        assert_eq!(request.duration_minutes, 15);
        assert_eq!(request.start_time.timestamp(), 1000);
        assert_eq!(request.end_time.timestamp(), 1900);
        assert_eq!(request.rating, 7.5);
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        let data = ProgramData {
            start_time: i64::MAX,
            end_time: i64::MAX,
            ..Default::default()
        };
        assert!(EpgProgramCreateRequest::from_program_data(Uuid::new_v4(), &data).is_none());
    }
}
