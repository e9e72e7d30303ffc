use crate::job::JobConfig;
use crate::job::JobRequest;
use crate::job::ResultMap;
use crate::result_printer::ResultPrinter;
use crate::social_lookup::SocialLookup;
use crate::stock_lookup::StockLookup;
use log::error;
use log::warn;

/// Runs the lookups a job asks for, one after another, and prints what they found.
pub struct Anansi {
    request: JobRequest,
    stock_lookup: StockLookup,
    social_lookup: Option<SocialLookup>,
    result_printer: ResultPrinter,
}

impl Anansi {
    pub fn new(config: JobConfig, result_printer: ResultPrinter) -> Self {
        let social_lookup = config
            .twitter_credentials
            .as_ref()
            .map(SocialLookup::authenticated);
        Self {
            request: config.request,
            stock_lookup: StockLookup::new(Default::default()),
            social_lookup,
            result_printer,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let results = self.collect().await;
        self.result_printer.print(&results)
    }

    async fn collect(&self) -> ResultMap {
        let mut results = ResultMap::default();

        if self.request.twitter {
            match &self.social_lookup {
                Some(_) if self.request.twitter_ids.is_empty() => {
                    warn!("Twitter lookup requested without any Twitter ID")
                }
                Some(social_lookup) => {
                    results.merge(social_lookup.lookup(&self.request.twitter_ids).await)
                }
                None => error!("Twitter lookup requested without credentials"),
            }
        }

        if !self.request.stock.is_empty() {
            results.merge(self.stock_lookup.lookup(&self.request.stock).await);
        }

        if results.is_empty() {
            warn!("Nothing was found");
        }
        if self.request.archive {
            archive_results(&results);
        }

        results
    }
}

fn archive_results(results: &ResultMap) {
    warn!(
        "Archiving is not supported yet, {} results are not saved",
        results.len()
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cli::Format;
    use crate::job::FieldMap;
    use crate::job::Ticker;
    use crate::twitter_client::MockTwitterClient;
    use crate::twitter_client::PublicMetrics;
    use crate::twitter_client::TwitterUser;
    use crate::yahoo_client::MockYahooClient;
    use serde_json::json;

    fn build_service(
        request: JobRequest,
        yahoo_client: MockYahooClient,
        twitter_client: Option<MockTwitterClient>,
    ) -> Anansi {
        Anansi {
            request,
            stock_lookup: StockLookup::new(yahoo_client),
            social_lookup: twitter_client.map(SocialLookup::new),
            result_printer: ResultPrinter::new(Format::Compact),
        }
    }

    #[tokio::test]
    async fn stock_only() -> anyhow::Result<()> {
        // Given
        let request = JobRequest {
            stock: vec![Ticker::from("AAPL".to_string())],
            ..Default::default()
        };
        let mut yahoo_client = MockYahooClient::default();
        yahoo_client
            .expect_ticker_info()
            .withf(|ticker| ticker == "AAPL")
            .times(1)
            .return_once(|_| {
                let raw = json!({ "marketCap": 1000, "sharesOutstanding": 50 });
                Ok(raw.as_object().cloned().unwrap_or_default())
            });
        let service = build_service(request, yahoo_client, None);

        // When
        let results = service.collect().await;

        // Then
        assert_eq!(
            r#"{"AAPL":{"marketCap":1000,"sharesOutstanding":50}}"#,
            service.result_printer.render(&results)?
        );
        Ok(())
    }

    #[tokio::test]
    async fn failing_twitter_account_is_skipped() {
        // Given
        let request = JobRequest {
            twitter: true,
            twitter_ids: vec!["42".into()],
            ..Default::default()
        };
        let mut twitter_client = MockTwitterClient::default();
        twitter_client
            .expect_user()
            .times(1)
            .return_once(|_| Err(anyhow::anyhow!("User has been suspended")));
        let service = build_service(request, MockYahooClient::default(), Some(twitter_client));

        // When
        let results = service.collect().await;

        // Then
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn twitter_and_stock_merged() {
        // Given
        let request = JobRequest {
            stock: vec![Ticker::from("TSLA".to_string())],
            twitter: true,
            twitter_ids: vec!["44196397".into()],
            archive: true,
        };
        let mut twitter_client = MockTwitterClient::default();
        twitter_client.expect_user().times(1).return_once(|_| {
            Ok(TwitterUser {
                id: "44196397".into(),
                name: "Elon Musk".into(),
                username: "elonmusk".into(),
                verified: true,
                public_metrics: PublicMetrics {
                    followers_count: 100,
                    following_count: 10,
                },
            })
        });
        let mut yahoo_client = MockYahooClient::default();
        yahoo_client
            .expect_ticker_info()
            .times(1)
            .return_once(|_| Ok(FieldMap::new()));
        let service = build_service(request, yahoo_client, Some(twitter_client));

        // When
        let results = service.collect().await;

        // Then
        assert_eq!(
            vec!["Elon Musk", "TSLA"],
            results.keys().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn twitter_without_ids_does_nothing() {
        // Given
        let request = JobRequest {
            twitter: true,
            ..Default::default()
        };
        let mut twitter_client = MockTwitterClient::default();
        twitter_client.expect_user().never();
        let service = build_service(request, MockYahooClient::default(), Some(twitter_client));

        // When
        let results = service.collect().await;

        // Then
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn twitter_not_requested_skips_social_lookup() {
        // Given
        let request = JobRequest {
            twitter_ids: vec!["42".into()],
            ..Default::default()
        };
        let mut twitter_client = MockTwitterClient::default();
        twitter_client.expect_user().never();
        let service = build_service(request, MockYahooClient::default(), Some(twitter_client));

        // When
        let results = service.collect().await;

        // Then
        assert!(results.is_empty());
    }
}
