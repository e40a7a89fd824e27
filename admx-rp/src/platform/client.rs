//! Marketing API client

use std::sync::Arc;
use std::time::{Duration, Instant};

use admx_common::model::{AccountHealth, CatalogEntity, EntityLevel, InsightRecord};
use admx_common::{DateRange, Error, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::wire::{Envelope, ErrorEnvelope, RawAccount, RawEntity, RawInsight};
use super::PlatformApi;

const USER_AGENT: &str = "ADMX/0.1.0";
const RATE_LIMIT_MS: u64 = 250; // keep under the platform's burst limits
const PAGE_LIMIT: usize = 50; // hard stop for runaway cursor chains

/// Minimum spacing between outgoing requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Platform rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP client for the advertising platform's Graph-style API
pub struct MarketingClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    base_url: String,
    access_token: String,
    account_id: RwLock<String>,
}

impl MarketingClient {
    pub fn new(base_url: &str, account_id: &str, access_token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Platform(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            account_id: RwLock::new(account_id.to_string()),
        })
    }

    async fn account_path(&self) -> String {
        let account = self.account_id.read().await;
        format!("{}/act_{}", self.base_url, *account)
    }

    /// GET a url, decoding the platform's error envelope on failure
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.wait().await;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Platform(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::Platform(format!("HTTP {}: {}", status, reason)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Platform(format!("decode error: {}", e)))
    }

    /// Follow cursor paging until exhausted
    async fn get_paged<T: serde::de::DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut url = Some(first_url);
        let mut pages = 0;

        while let Some(current) = url.take() {
            let envelope: Envelope<T> = self.get_json(&current).await?;
            items.extend(envelope.data);
            pages += 1;
            if pages >= PAGE_LIMIT {
                tracing::warn!(pages, "Stopping cursor chain at page limit");
                break;
            }
            url = envelope.paging.and_then(|p| p.next);
        }
        Ok(items)
    }

    fn catalog_edge(level: EntityLevel) -> &'static str {
        match level {
            EntityLevel::Campaign => "campaigns",
            EntityLevel::AdSet => "adsets",
            EntityLevel::Ad => "ads",
        }
    }

    fn catalog_fields(level: EntityLevel) -> &'static str {
        match level {
            EntityLevel::Campaign => {
                "id,name,status,effective_status,objective,daily_budget,lifetime_budget"
            }
            EntityLevel::AdSet => {
                "id,name,status,effective_status,campaign_id,daily_budget,lifetime_budget"
            }
            EntityLevel::Ad => "id,name,status,effective_status,campaign_id,adset_id",
        }
    }
}

#[async_trait]
impl PlatformApi for MarketingClient {
    async fn fetch_catalog(&self, level: EntityLevel) -> Result<Vec<CatalogEntity>> {
        let url = format!(
            "{}/{}?fields={}&limit=200&access_token={}",
            self.account_path().await,
            Self::catalog_edge(level),
            Self::catalog_fields(level),
            self.access_token,
        );
        let raw: Vec<RawEntity> = self.get_paged(url).await?;
        tracing::debug!(level = %level, count = raw.len(), "Fetched catalog page set");
        Ok(raw.into_iter().map(|e| e.into_catalog(level)).collect())
    }

    async fn fetch_insights(
        &self,
        level: EntityLevel,
        range: &DateRange,
    ) -> Result<Vec<InsightRecord>> {
        let fields = "campaign_id,adset_id,ad_id,date_start,spend,impressions,clicks,reach,\
                      actions,cost_per_action_type,objective";
        let time_range = format!(
            "{{\"since\":\"{}\",\"until\":\"{}\"}}",
            range.since, range.until
        );
        let url = format!(
            "{}/insights?level={}&fields={}&time_range={}&time_increment=1&limit=500&access_token={}",
            self.account_path().await,
            level,
            fields,
            time_range,
            self.access_token,
        );
        let raw: Vec<RawInsight> = self.get_paged(url).await?;
        let total = raw.len();
        let records: Vec<InsightRecord> = raw
            .into_iter()
            .filter_map(|r| r.into_record(level))
            .collect();
        if records.len() < total {
            // Malformed rows are dropped, never fatal
            tracing::warn!(
                level = %level,
                dropped = total - records.len(),
                "Dropped malformed insight rows"
            );
        }
        Ok(records)
    }

    async fn account_status(&self) -> Result<AccountHealth> {
        let url = format!(
            "{}?fields=account_status&access_token={}",
            self.account_path().await,
            self.access_token,
        );
        let raw: RawAccount = self.get_json(&url).await?;
        // Platform account_status: 1 = active, 2 = disabled, 3 = unsettled
        Ok(match raw.account_status {
            Some(1) => AccountHealth::Healthy,
            Some(3) => AccountHealth::Unpaid,
            _ => AccountHealth::Disabled,
        })
    }

    async fn update_status(&self, id: &str, _level: EntityLevel, active: bool) -> Result<()> {
        self.rate_limiter.wait().await;

        let status = if active { "ACTIVE" } else { "PAUSED" };
        let url = format!("{}/{}", self.base_url, id);
        let params = [
            ("status", status),
            ("access_token", self.access_token.as_str()),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Platform(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if envelope.error.is_rate_limit() => Err(Error::StatusUpdateRateLimited),
            Ok(envelope) => Err(Error::StatusUpdateRejected {
                reason: envelope.error.message,
            }),
            Err(_) => Err(Error::StatusUpdateRejected { reason: body }),
        }
    }

    async fn set_account(&self, account_id: &str) {
        *self.account_id.write().await = account_id.to_string();
    }
}
