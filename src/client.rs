use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use tracing::{debug, info};

use crate::auth::CrmAuth;
use crate::models::task::{LeadRecord, LeadTask, TaskListResponse};
use crate::providers::{ProviderError, TaskSource};

/// Client for a Close-style CRM API.
pub struct CloseCrmClient {
    client: Client,
    endpoint: String,
    auth_header: String,
}

impl CloseCrmClient {
    /// Create a new CRM client from environment variables
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_key = env::var("CRM_API_KEY").expect("CRM_API_KEY must be set in environment");

        Self {
            client: Client::new(),
            endpoint: env::var("CRM_API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.close.com/api/v1".to_string()),
            auth_header: CrmAuth::basic_header(&api_key),
        }
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = res.text().await.unwrap_or_else(|_| "<no body>".to_string());
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TaskSource for CloseCrmClient {
    /// Search incomplete lead tasks whose text contains the query string.
    async fn search(&self, query: &str) -> Result<Vec<LeadTask>, ProviderError> {
        let url = format!("{}/task/", self.endpoint);

        info!("Searching CRM tasks containing '{}'", query);
        debug!("API URL: {}", url);

        let res = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .query(&[
                ("_type", "lead"),
                ("text__icontains", query),
                ("is_complete", "false"),
            ])
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        let response = res.json::<TaskListResponse>().await?;

        info!("CRM search returned {} task(s)", response.data.len());

        Ok(response
            .data
            .into_iter()
            .filter(|task| !task.is_complete)
            .map(LeadTask::from_crm)
            .collect())
    }

    /// Fill company and contact fields from the owning lead record.
    async fn enrich(&self, task: LeadTask) -> Result<LeadTask, ProviderError> {
        let url = format!("{}/lead/{}/", self.endpoint, task.lead_id);
        debug!("Enriching task {} from {}", task.id, url);

        let res = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let res = Self::check_status(res).await?;
        let lead = res.json::<LeadRecord>().await?;

        Ok(task.with_lead_details(&lead))
    }

    /// Mark the originating task complete in the CRM.
    async fn complete(&self, task_id: &str) -> Result<(), ProviderError> {
        let url = format!("{}/task/{}/", self.endpoint, task_id);
        info!("Marking CRM task {} complete", task_id);

        let res = self
            .client
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({ "is_complete": true }))
            .send()
            .await?;

        Self::check_status(res).await?;
        Ok(())
    }
}
