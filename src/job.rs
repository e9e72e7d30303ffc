use crate::cli::Cli;
use crate::config::TwitterCredentials;
use derive_more::Display;
use derive_more::From;
use itertools::Itertools;
use log::info;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Fields retained for one ticker or account, in insertion order.
pub type FieldMap = serde_json::Map<String, Value>;

#[derive(From, Display, Debug, PartialEq, Eq, Hash, Clone)]
pub struct Ticker(String);

impl Ticker {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the user asked for. Never modified once built.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct JobRequest {
    pub stock: Vec<Ticker>,
    pub twitter: bool,
    pub twitter_ids: Vec<String>,
    pub archive: bool,
}

impl JobRequest {
    pub fn log_arguments(&self) {
        info!("Starting up Anansi");
        info!("************************");
        info!("* Arguments to Execute *");
        info!("************************");
        info!("stock={}", self.stock.iter().join(","));
        info!("twitter={}", self.twitter);
        info!("twitter_id={}", self.twitter_ids.iter().join(","));
        info!("archive={}", self.archive);
        info!("************************");
    }
}

impl From<&Cli> for JobRequest {
    fn from(cli: &Cli) -> Self {
        Self {
            stock: normalize_tickers(&cli.stock),
            twitter: cli.twitter,
            twitter_ids: normalize_twitter_ids(&cli.twitter_id),
            archive: cli.archive,
        }
    }
}

fn normalize_tickers(raw: &[String]) -> Vec<Ticker> {
    raw.iter()
        .map(|ticker| ticker.trim().to_uppercase())
        .filter(|ticker| !ticker.is_empty())
        .unique()
        .map(Ticker::from)
        .collect()
}

fn normalize_twitter_ids(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|id| id.trim().trim_start_matches('@').to_string())
        .filter(|id| !id.is_empty())
        .unique()
        .collect()
}

/// A request together with the credentials it needs.
#[derive(Debug, PartialEq, Eq)]
pub struct JobConfig {
    pub request: JobRequest,
    pub twitter_credentials: Option<TwitterCredentials>,
}

impl JobConfig {
    /// Reads the config file only if the request involves Twitter.
    pub async fn load(request: JobRequest, config_path: &Path) -> anyhow::Result<Self> {
        let twitter_credentials = if request.twitter {
            Some(TwitterCredentials::load(config_path).await?)
        } else {
            None
        };
        Ok(Self {
            request,
            twitter_credentials,
        })
    }
}

/// Lookup results keyed by ticker or account display name.
#[derive(Serialize, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct ResultMap {
    entries: serde_json::Map<String, Value>,
}

impl ResultMap {
    pub fn insert(&mut self, key: String, fields: FieldMap) {
        if self.entries.contains_key(&key) {
            warn!("Overwriting results of `{}`", &key);
        }
        self.entries.insert(key, Value::Object(fields));
    }

    pub fn merge(&mut self, other: ResultMap) {
        for (key, fields) in other.entries {
            if let Value::Object(fields) = fields {
                self.insert(key, fields);
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FieldMap> {
        self.entries.get(key).and_then(Value::as_object)
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
