//! Quotes and instrument lookups.

use futures::future::join_all;
use serde_json::Value;
use tracing::warn;

use crate::api::GetMode;
use crate::shape::extract;
use crate::utils::normalize_symbols;
use crate::RobinhoodClient;

/// Which price `get_latest_price` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceType {
    Ask,
    Bid,
    /// Last trade, using the extended-hours trade when asked for and present.
    LastTrade { include_extended_hours: bool },
}

impl RobinhoodClient {
    /// Quotes for each symbol, in input order. Unknown tickers are dropped.
    pub async fn get_quotes<S: AsRef<str>>(&self, symbols: &[S], info: Option<&str>) -> Option<Value> {
        let symbols = normalize_symbols(symbols);
        let joined = symbols.join(",");
        let data = self
            .transport()
            .get(&self.urls().quotes(), GetMode::Results, &[("symbols", joined.as_str())])
            .await;

        let quotes = match data {
            Some(Value::Array(quotes)) => quotes,
            other => return other,
        };

        let mut found = Vec::with_capacity(quotes.len());
        for (i, quote) in quotes.into_iter().enumerate() {
            if quote.is_null() {
                let symbol = symbols.get(i).map(String::as_str).unwrap_or("?");
                warn!(symbol, "Not a valid stock ticker, ignoring it");
            } else {
                found.push(quote);
            }
        }

        extract(Some(Value::Array(found)), info)
    }

    /// Latest price per symbol as the API's decimal string, `None` for
    /// tickers without a quote.
    pub async fn get_latest_price<S: AsRef<str>>(
        &self,
        symbols: &[S],
        price_type: PriceType,
    ) -> Vec<Option<String>> {
        let quotes = match self.get_quotes(symbols, None).await {
            Some(Value::Array(quotes)) => quotes,
            _ => return Vec::new(),
        };

        quotes
            .iter()
            .map(|quote| {
                let field = match price_type {
                    PriceType::Ask => "ask_price",
                    PriceType::Bid => "bid_price",
                    PriceType::LastTrade { include_extended_hours } => {
                        let extended = quote
                            .get("last_extended_hours_trade_price")
                            .is_some_and(|v| !v.is_null());
                        if include_extended_hours && extended {
                            "last_extended_hours_trade_price"
                        } else {
                            "last_trade_price"
                        }
                    }
                };
                quote.get(field).and_then(Value::as_str).map(str::to_string)
            })
            .collect()
    }

    /// Instrument records for each symbol, looked up concurrently.
    pub async fn get_instruments_by_symbols<S: AsRef<str>>(
        &self,
        symbols: &[S],
        info: Option<&str>,
    ) -> Option<Value> {
        let symbols = normalize_symbols(symbols);
        let url = self.urls().instruments();

        let lookups = symbols.iter().map(|symbol| {
            let url = url.clone();
            async move {
                let data = self
                    .transport()
                    .get(&url, GetMode::IndexZero, &[("symbol", symbol.as_str())])
                    .await;
                (symbol, data)
            }
        });

        let mut instruments = Vec::new();
        for (symbol, data) in join_all(lookups).await {
            match data {
                Some(instrument) => instruments.push(instrument),
                None => warn!(symbol = %symbol, "Not a valid stock ticker, ignoring it"),
            }
        }

        extract(Some(Value::Array(instruments)), info)
    }

    /// Instrument id of a ticker.
    pub async fn id_for_stock(&self, symbol: &str) -> Option<String> {
        let symbol = symbol.trim().to_uppercase();
        let data = self
            .transport()
            .get(&self.urls().instruments(), GetMode::IndexZero, &[("symbol", symbol.as_str())])
            .await;
        extract(data, Some("id")).and_then(|v| v.as_str().map(str::to_string))
    }

    /// Options chain id of a ticker.
    pub async fn id_for_chain(&self, symbol: &str) -> Option<String> {
        let symbol = symbol.trim().to_uppercase();
        let data = self
            .transport()
            .get(&self.urls().instruments(), GetMode::IndexZero, &[("symbol", symbol.as_str())])
            .await;
        extract(data, Some("tradable_chain_id")).and_then(|v| v.as_str().map(str::to_string))
    }

    /// Id of the underlying instrument of a ticker's options chain.
    pub async fn id_for_group(&self, symbol: &str) -> Option<String> {
        let chain_id = self.id_for_chain(symbol).await?;
        let chain = self
            .transport()
            .get(&self.urls().chain(&chain_id), GetMode::Regular, &[])
            .await?;
        chain
            .get("underlying_instruments")
            .and_then(|instruments| instruments.get(0))
            .and_then(|instrument| instrument.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
