//! CoinGecko market data provider.
//!
//! - Market listing via /coins/markets (ingestion)
//! - Spot prices via /simple/price
//!
//! Authenticated with the demo API key header. API documentation:
//! https://docs.coingecko.com/v3.0.1/reference/introduction

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ProviderSettings;
use crate::error::{Error, Result};
use crate::provider::MarketDataProvider;

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub struct CoinGeckoProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(api_key: String, settings: &ProviderSettings) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            api_key,
            vs_currency: settings.vs_currency.clone(),
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.base_url.join(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("CoinGecko request to {} failed: {}", path, e);
                e
            })?;

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn fetch_markets(&self) -> Result<Value> {
        self.get_json("coins/markets", &[("vs_currency", self.vs_currency.as_str())])
            .await
    }

    async fn fetch_prices(&self, ids: &[String], currency: &str) -> Result<HashMap<String, f64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = ids.join(",");
        let body = self
            .get_json(
                "simple/price",
                &[("ids", joined.as_str()), ("vs_currencies", currency)],
            )
            .await?;

        // {"bitcoin": {"usd": 67187.33}, ...}
        let Value::Object(entries) = body else {
            return Err(Error::UnexpectedPayload(
                "simple/price did not return an object".to_string(),
            ));
        };

        Ok(entries
            .into_iter()
            .filter_map(|(id, quote)| {
                let price = quote.get(currency).and_then(Value::as_f64)?;
                Some((id, price))
            })
            .collect())
    }
}
