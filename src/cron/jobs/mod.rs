pub mod ingest_market_data;
