use crate::job::FieldMap;
use anyhow::Context;
use reqwest::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str =
    "assetProfile,summaryDetail,defaultKeyStatistics,financialData,price";
const USER_AGENT: &str = "Mozilla/5.0";

/// Client of the Yahoo Finance quote summary API.
///
/// The cookie and crumb Yahoo demands are obtained on the first request and reused afterwards.
#[derive(Default)]
pub struct YahooClient {
    session: OnceCell<Session>,
}

#[mockall::automock]
impl YahooClient {
    /// Fetches all fundamentals of `ticker` as one flat map.
    pub async fn ticker_info(&self, ticker: &str) -> anyhow::Result<FieldMap> {
        let session = self
            .session
            .get_or_try_init(Session::open)
            .await
            .context("Failed to open a Yahoo Finance session")?;
        let response = session
            .client
            .get(quote_summary_url(ticker)?)
            .query(&[
                ("modules", QUOTE_SUMMARY_MODULES),
                ("crumb", session.crumb.as_str()),
            ])
            .send()
            .await?;

        // Unknown tickers come back as 404 with a JSON error body.
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<QuoteSummaryResponse>(&body) {
            Ok(parsed) => flatten_quote_summary(parsed.quote_summary),
            Err(_) if !status.is_success() => anyhow::bail!("{}: {}", status, body),
            Err(e) => Err(e).context("Malformed quote summary"),
        }
    }
}

fn quote_summary_url(ticker: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(QUOTE_SUMMARY_URL)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("{} cannot take a path", QUOTE_SUMMARY_URL))?
        .push(ticker);
    Ok(url)
}

struct Session {
    client: Client,
    crumb: String,
}

impl Session {
    async fn open() -> anyhow::Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        // Only the cookie matters, the page itself is an error.
        client.get(COOKIE_URL).send().await?;

        let crumb = client
            .get(CRUMB_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if crumb.is_empty() || crumb.contains('<') {
            anyhow::bail!("Yahoo Finance refused to issue a crumb")
        }
        Ok(Self { client, crumb })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Deserialize)]
struct QuoteSummary {
    result: Option<Vec<serde_json::Map<String, Value>>>,
    error: Option<QuoteSummaryError>,
}

#[derive(Deserialize)]
struct QuoteSummaryError {
    code: String,
    description: String,
}

fn flatten_quote_summary(summary: QuoteSummary) -> anyhow::Result<FieldMap> {
    if let Some(error) = summary.error {
        anyhow::bail!("{}: {}", error.code, error.description)
    }
    let modules = summary
        .result
        .and_then(|result| result.into_iter().next())
        .context("Quote summary has no result")?;
    Ok(flatten_modules(modules))
}

/// Merges all modules into one map. The first module providing a field wins.
fn flatten_modules(modules: serde_json::Map<String, Value>) -> FieldMap {
    let mut fields = FieldMap::new();
    for (_, module) in modules {
        let Value::Object(module) = module else {
            continue;
        };
        for (key, value) in module {
            if key == "maxAge" || fields.contains_key(&key) {
                continue;
            }
            if let Some(value) = unwrap_raw(value) {
                fields.insert(key, value);
            }
        }
    }
    fields
}

/// Turns `{"raw": 1.5, "fmt": "1.50"}` into `1.5`, recursively. Nulls and empty objects become `None`.
fn unwrap_raw(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(mut object) => match object.remove("raw") {
            Some(raw) => unwrap_raw(raw),
            None => {
                let object: serde_json::Map<_, _> = object
                    .into_iter()
                    .filter_map(|(key, value)| unwrap_raw(value).map(|value| (key, value)))
                    .collect();
                (!object.is_empty()).then_some(Value::Object(object))
            }
        },
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(unwrap_raw).collect(),
        )),
        other => Some(other),
    }
}
