use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::UpstreamSource;
use crate::config::{EpgQueryConfig, UpstreamConfig};
use crate::errors::{SourceError, SourceResult};
use crate::models::{EpgRequest, EpgResponse, PlaylistResponse};
use crate::utils::UrlUtils;

/// reqwest client preconfigured with the upstream headers and timeout
pub struct HttpUpstreamSource {
    client: Client,
    playlist_url: String,
    epg_url: String,
    epg_query: EpgQueryConfig,
}

impl HttpUpstreamSource {
    pub fn new(config: &UpstreamConfig) -> SourceResult<Self> {
        let headers = Self::build_headers(config)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::InvalidConfig {
                field: "upstream".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            playlist_url: config.playlist_url.clone(),
            epg_url: config.epg_url.clone(),
            epg_query: config.epg_query.clone(),
        })
    }

    fn build_headers(config: &UpstreamConfig) -> SourceResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| SourceError::InvalidConfig {
                    field: format!("upstream.headers.{name}"),
                    message: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| SourceError::InvalidConfig {
                    field: format!("upstream.headers.{name}"),
                    message: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Query string for one EPG fetch: channel id, timezone and the fixed window
    fn epg_query_params(&self, request: &EpgRequest) -> Vec<(&'static str, String)> {
        vec![
            ("id", request.channel_external_id.clone()),
            ("tz", request.tz_offset.to_string()),
            ("epg_from", self.epg_query.epg_from.to_string()),
            ("epg_limit", self.epg_query.epg_limit.to_string()),
            ("grouping", self.epg_query.grouping.to_string()),
            ("region", self.epg_query.region.to_string()),
            ("lang", self.epg_query.lang.clone()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> SourceResult<T> {
        let domain = UrlUtils::extract_domain(url).unwrap_or_default();
        debug!(
            upstream = %domain,
            "Fetching JSON from {} ({} query params)",
            UrlUtils::obfuscate_credentials(url),
            query.len()
        );

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?
            .error_for_status()
            .map_err(|e| SourceError::from_reqwest(url, e))?;

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))
    }
}

#[async_trait]
impl UpstreamSource for HttpUpstreamSource {
    async fn fetch_playlist(&self) -> SourceResult<PlaylistResponse> {
        let response: PlaylistResponse = self.get_json(&self.playlist_url, &[]).await?;
        debug!("Playlist response contained {} channels", response.channels.len());
        Ok(response)
    }

    async fn fetch_epg(&self, request: &EpgRequest) -> SourceResult<EpgResponse> {
        let params = self.epg_query_params(request);
        let response: EpgResponse = self.get_json(&self.epg_url, &params).await?;
        debug!(
            external_id = %request.channel_external_id,
            programs = response.programs.len(),
            "EPG response received"
        );
        Ok(response)
    }
}
