use crate::job::FieldMap;
use crate::job::ResultMap;
use crate::job::Ticker;
use log::error;
use log::info;
use log::warn;

#[mockall_double::double]
use crate::yahoo_client::YahooClient;

/// Fundamentals worth keeping out of everything Yahoo returns.
pub const BUFFET: [&str; 16] = [
    "sector",
    "fullTimeEmployees",
    "marketCap",
    "sharesOutstanding",
    "floatShares",
    "heldPercentInsiders",
    "heldPercentInstitutions",
    "shortRatio",
    "bookValue",
    "priceToBook",
    "trailingEps",
    "forwardEps",
    "trailingPE",
    "forwardPE",
    "dividendYield",
    "beta",
];

pub struct StockLookup {
    yahoo_client: YahooClient,
}

impl StockLookup {
    pub fn new(yahoo_client: YahooClient) -> Self {
        Self { yahoo_client }
    }

    /// Tickers that fail to load are logged and left out of the result.
    pub async fn lookup(&self, tickers: &[Ticker]) -> ResultMap {
        let mut results = ResultMap::default();
        for ticker in tickers {
            info!("Looking up stock {}", ticker);
            let ticker_info = match self.yahoo_client.ticker_info(ticker.as_str()).await {
                Ok(ticker_info) => ticker_info,
                Err(e) => {
                    error!("Failed to look up stock {}: {:#}", ticker, e);
                    continue;
                }
            };
            let (fields, missing_fields) = filter_fields(&ticker_info);
            for field in missing_fields {
                warn!("{}: `{}` not found", ticker, field);
            }
            results.insert(ticker.to_string(), fields);
        }
        results
    }
}

/// Picks the buffet fields in buffet order. Also returns the buffet fields that are absent.
fn filter_fields(ticker_info: &FieldMap) -> (FieldMap, Vec<&'static str>) {
    let mut fields = FieldMap::new();
    let mut missing_fields = Vec::new();
    for field in BUFFET {
        match ticker_info.get(field) {
            Some(value) => {
                fields.insert(field.to_string(), value.clone());
            }
            None => missing_fields.push(field),
        }
    }
    (fields, missing_fields)
}
