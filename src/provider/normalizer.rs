use serde_json::Value;

/// Fixed-shape view of one provider record. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketRecord {
    pub external_id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

/// Normalizes provider records in input order.
///
/// Missing keys, JSON nulls and values of the wrong JSON type all become
/// `None`; nothing is filtered out here.
pub fn normalize(raw: &[Value]) -> Vec<MarketRecord> {
    raw.iter().map(normalize_record).collect()
}

fn normalize_record(raw: &Value) -> MarketRecord {
    MarketRecord {
        external_id: text(raw, "id"),
        symbol: text(raw, "symbol"),
        name: text(raw, "name"),
        image: text(raw, "image"),
        current_price: number(raw, "current_price"),
        market_cap: number(raw, "market_cap"),
        total_volume: number(raw, "total_volume"),
        price_change_percentage_24h: number(raw, "price_change_percentage_24h"),
    }
}

fn text(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number(raw: &Value, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let raw = vec![json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 67187.34,
            "market_cap": 1317802988326_u64,
            "total_volume": 31260929299_u64,
            "price_change_percentage_24h": -1.25,
            "ath": 73738.0
        })];

        let records = normalize(&raw);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.external_id.as_deref(), Some("bitcoin"));
        assert_eq!(r.symbol.as_deref(), Some("btc"));
        assert_eq!(r.name.as_deref(), Some("Bitcoin"));
        assert!(r.image.as_deref().unwrap().ends_with("bitcoin.png"));
        assert_eq!(r.current_price, Some(67187.34));
        assert_eq!(r.market_cap, Some(1317802988326.0));
        assert_eq!(r.total_volume, Some(31260929299.0));
        assert_eq!(r.price_change_percentage_24h, Some(-1.25));
    }

    #[test]
    fn test_missing_and_null_fields_become_none() {
        let raw = vec![json!({ "id": "ethereum", "market_cap": null })];

        let r = &normalize(&raw)[0];

        assert_eq!(r.external_id.as_deref(), Some("ethereum"));
        assert_eq!(r.symbol, None);
        assert_eq!(r.market_cap, None);
        assert_eq!(r.current_price, None);
    }

    #[test]
    fn test_wrong_types_become_none() {
        let raw = vec![json!({ "id": 42, "current_price": "12.5", "name": ["x"] })];

        assert_eq!(normalize(&raw)[0], MarketRecord::default());
    }

    #[test]
    fn test_non_object_records_are_kept_as_empty() {
        let raw = vec![json!("bitcoin"), json!(null), json!({ "id": "solana" })];

        let records = normalize(&raw);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], MarketRecord::default());
        assert_eq!(records[1], MarketRecord::default());
        assert_eq!(records[2].external_id.as_deref(), Some("solana"));
    }

    #[test]
    fn test_order_preserved() {
        let raw = vec![json!({ "id": "c" }), json!({ "id": "a" }), json!({ "id": "b" })];

        let ids: Vec<_> = normalize(&raw)
            .into_iter()
            .map(|r| r.external_id.unwrap())
            .collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
