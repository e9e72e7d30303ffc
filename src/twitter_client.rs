use crate::config::TwitterCredentials;
use anyhow::Context;
use chrono::DateTime;
use chrono::Utc;
use log::warn;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

const API_URL: &str = "https://api.twitter.com/2";
const USER_FIELDS: &str = "public_metrics,verified";
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Default)]
pub struct TwitterClient {
    client: Client,
    bearer_token: String,
}

#[mockall::automock]
impl TwitterClient {
    pub fn authenticate(&mut self, credentials: &TwitterCredentials) {
        self.bearer_token = credentials.bearer_token.clone();
    }

    /// Resolves a numeric user ID or a username.
    ///
    /// Blocks until the rate limit resets whenever Twitter rejects the request with HTTP 429.
    pub async fn user(&self, account: &str) -> anyhow::Result<TwitterUser> {
        if self.bearer_token.is_empty() {
            anyhow::bail!("Not authenticated to Twitter")
        }
        let url = user_url(account)?;
        loop {
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.bearer_token)
                .query(&[("user.fields", USER_FIELDS)])
                .send()
                .await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = rate_limit_wait(response.headers(), Utc::now());
                warn!(
                    "Twitter rate limit reached, retrying in {} seconds",
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                continue;
            }
            if !status.is_success() {
                anyhow::bail!("{}: {}", status, response.text().await?)
            }
            let user_response: UserResponse = response
                .json()
                .await
                .context("Malformed Twitter user response")?;
            return user_response.into_user();
        }
    }
}

fn user_url(account: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(API_URL)?;
    let mut segments = url
        .path_segments_mut()
        .map_err(|_| anyhow::anyhow!("{} cannot take a path", API_URL))?;
    if !account.is_empty() && account.chars().all(|c| c.is_ascii_digit()) {
        segments.extend(["users", account]);
    } else {
        segments.extend(["users", "by", "username", account]);
    }
    drop(segments);
    Ok(url)
}

fn rate_limit_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Duration {
    let reset = headers
        .get(RATE_LIMIT_RESET_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0));
    match reset {
        Some(reset) => (reset - now).to_std().unwrap_or_default() + Duration::from_secs(1),
        None => RATE_LIMIT_WINDOW,
    }
}

#[derive(Deserialize)]
struct UserResponse {
    data: Option<TwitterUser>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

impl UserResponse {
    fn into_user(self) -> anyhow::Result<TwitterUser> {
        if let Some(user) = self.data {
            return Ok(user);
        }
        match self.errors.into_iter().next() {
            Some(error) => anyhow::bail!("{}: {}", error.title, error.detail),
            None => anyhow::bail!("Twitter returned neither a user nor an error"),
        }
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Default, Clone)]
pub struct TwitterUser {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub public_metrics: PublicMetrics,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Default, Clone)]
pub struct PublicMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}
