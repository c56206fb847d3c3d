//! Account data. Every call here needs a logged-in session.

use serde_json::Value;

use crate::api::GetMode;
use crate::shape::extract;
use crate::{Result, RobinhoodClient};

impl RobinhoodClient {
    /// Stock positions with a non-zero quantity.
    pub async fn get_open_stock_positions(&self, info: Option<&str>) -> Result<Option<Value>> {
        self.transport().require_login("get_open_stock_positions").await?;
        let data = self
            .transport()
            .get(&self.urls().positions(), GetMode::Pagination, &[("nonzero", "true")])
            .await;
        Ok(extract(data, info))
    }

    /// The brokerage account record.
    pub async fn load_account_profile(&self, info: Option<&str>) -> Result<Option<Value>> {
        self.transport().require_login("load_account_profile").await?;
        let data = self
            .transport()
            .get(&self.urls().account_profile(), GetMode::IndexZero, &[])
            .await;
        Ok(extract(data, info))
    }
}
