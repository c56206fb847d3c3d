//! Market-level data.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::error;

use crate::api::GetMode;
use crate::shape::extract;
use crate::RobinhoodClient;

impl RobinhoodClient {
    /// Every market the API knows, with its MIC and hours URLs.
    pub async fn get_markets(&self, info: Option<&str>) -> Option<Value> {
        let data = self
            .transport()
            .get(&self.urls().markets(), GetMode::Pagination, &[])
            .await;
        extract(data, info)
    }

    /// Opening and closing hours of market `mic` on `date`.
    pub async fn get_market_hours(&self, mic: &str, date: NaiveDate, info: Option<&str>) -> Option<Value> {
        let data = self
            .transport()
            .get(&self.urls().market_hours(mic, date), GetMode::Regular, &[])
            .await;
        extract(data, info)
    }

    /// Top S&P 500 movers, `direction` is `up` or `down`.
    pub async fn get_top_movers_sp500(&self, direction: &str, info: Option<&str>) -> Option<Value> {
        let direction = direction.trim().to_lowercase();
        if direction != "up" && direction != "down" {
            error!(direction = %direction, "direction must be \"up\" or \"down\"");
            return GetMode::Pagination.empty();
        }

        let data = self
            .transport()
            .get(
                &self.urls().movers_sp500(),
                GetMode::Pagination,
                &[("direction", direction.as_str())],
            )
            .await;
        extract(data, info)
    }
}
