use super::{oauth, StatusApi};
use crate::config::Credentials;
use crate::model::Post;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The v1.1 lookup endpoint accepts at most this many ids per request.
pub const LOOKUP_CHUNK: usize = 100;

const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Authenticated v1.1 REST client. Every request carries a fresh OAuth 1.0a signature.
pub struct TwitterClient {
    pub api_base: String,
    credentials: Credentials,
    pub client: reqwest::Client,
}

impl TwitterClient {
    pub fn new(api_base: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/1.1/{}", self.api_base, path)
    }

    fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
    ) -> anyhow::Result<String> {
        oauth::authorization_header(
            &self.credentials,
            method,
            url,
            params,
            &oauth::nonce(),
            Utc::now().timestamp(),
        )
    }

    async fn lookup_chunk(&self, ids: &[u64]) -> anyhow::Result<Vec<Post>> {
        let url = self.endpoint("statuses/lookup.json");
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let params = vec![
            ("id".to_string(), joined),
            ("trim_user".to_string(), "true".to_string()),
            ("tweet_mode".to_string(), "extended".to_string()),
        ];

        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.authorization("GET", &url, &params)?)
            .query(&params)
            .send()
            .await
            .context("status lookup request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("status lookup API error ({}): {}", status, error_text);
        }

        let raw: Vec<RawStatus> = resp
            .json()
            .await
            .context("failed to parse status lookup response")?;
        raw.into_iter().map(RawStatus::into_post).collect()
    }
}

#[async_trait]
impl StatusApi for TwitterClient {
    async fn lookup(&self, ids: &[u64]) -> anyhow::Result<Vec<Post>> {
        let mut posts = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(LOOKUP_CHUNK) {
            posts.extend(self.lookup_chunk(chunk).await?);
        }
        Ok(posts)
    }

    async fn post_reply(&self, text: &str, in_reply_to: u64) -> anyhow::Result<Post> {
        let url = self.endpoint("statuses/update.json");
        let params = vec![
            ("status".to_string(), text.to_string()),
            ("in_reply_to_status_id".to_string(), in_reply_to.to_string()),
            (
                "auto_populate_reply_metadata".to_string(),
                "true".to_string(),
            ),
        ];

        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.authorization("POST", &url, &params)?)
            .form(&params)
            .send()
            .await
            .context("status update request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("status update API error ({}): {}", status, error_text);
        }

        let raw: RawStatus = resp
            .json()
            .await
            .context("failed to parse status update response")?;
        raw.into_post()
    }

    fn provider_name(&self) -> &'static str {
        "twitter"
    }
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    id: u64,
    created_at: String,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    in_reply_to_status_id: Option<u64>,
}

impl RawStatus {
    fn into_post(self) -> anyhow::Result<Post> {
        let created_at = parse_created_at(&self.created_at)
            .with_context(|| format!("status {} has bad created_at", self.id))?;
        Ok(Post {
            id: self.id,
            created_at,
            text: self.full_text.or(self.text).unwrap_or_default(),
            in_reply_to_id: self.in_reply_to_status_id,
        })
    }
}

/// Parses `Wed Oct 10 20:19:24 +0000 2018`.
pub fn parse_created_at(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .with_context(|| format!("unrecognised timestamp {:?}", raw))?;
    Ok(dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn created_at_format() {
        let dt = parse_created_at("Wed Oct 10 20:19:24 +0000 2018").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap());
        assert!(parse_created_at("2018-10-10T20:19:24Z").is_err());
    }

    #[test]
    fn raw_status_prefers_full_text() {
        let raw: RawStatus = serde_json::from_value(serde_json::json!({
            "id": 1246950287403737088u64,
            "id_str": "1246950287403737088",
            "created_at": "Mon Apr 06 00:00:01 +0000 2020",
            "text": "April 5th\n\nConfirmed…",
            "full_text": "April 5th\n\nConfirmed COVID-19 cases in the US: 337,072.",
            "in_reply_to_status_id": null
        }))
        .unwrap();
        let post = raw.into_post().unwrap();
        assert_eq!(post.id, 1246950287403737088);
        assert!(post.text.ends_with("337,072."));
        assert!(post.is_origin());
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let c = TwitterClient::new(
            "http://localhost:9999/",
            Credentials {
                api_key: "k".into(),
                api_secret_key: "s".into(),
                access_token: "t".into(),
                access_token_secret: "ts".into(),
            },
        );
        assert_eq!(
            c.endpoint("statuses/lookup.json"),
            "http://localhost:9999/1.1/statuses/lookup.json"
        );
    }
}
