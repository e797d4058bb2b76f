//! Scripted `MarketDataProvider` used by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::provider::MarketDataProvider;

pub struct StubProvider {
    payloads: Mutex<Vec<Value>>,
    repeat_last: bool,
}

impl StubProvider {
    /// Hands out `payloads` in order, one per call, then fails.
    pub fn queued(payloads: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(payloads),
            repeat_last: false,
        })
    }

    /// Returns `payload` on every call.
    pub fn repeating(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(vec![payload]),
            repeat_last: true,
        })
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_markets(&self) -> Result<Value> {
        let mut payloads = self.payloads.lock().unwrap();
        match payloads.len() {
            0 => Err(Error::UnexpectedPayload("no payload queued".to_string())),
            1 if self.repeat_last => Ok(payloads[0].clone()),
            _ => Ok(payloads.remove(0)),
        }
    }

    async fn fetch_prices(&self, _: &[String], _: &str) -> Result<HashMap<String, f64>> {
        Ok(HashMap::new())
    }
}
