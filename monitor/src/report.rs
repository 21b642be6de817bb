use std::time::Duration;

use anyhow::Context;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpReporter {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpReporter {
    pub fn new(endpoint: String, token: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build report http client")?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    // Fire and forget: a failed POST is logged and dropped, and the next
    // scheduled report carries a fresh reading anyway.
    pub async fn post_temperature(&self, temperature_f: f32) {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(report_body(temperature_f));
        if !self.token.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                info!("report POST {} -> {status}: {body}", self.endpoint);
            }
            Err(err) => warn!("report POST {} failed: {err}", self.endpoint),
        }
    }
}

fn report_body(temperature_f: f32) -> String {
    format!("{{\"value\": {temperature_f:.4}}}")
}
