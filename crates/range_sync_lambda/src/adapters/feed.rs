use serde_json::Value;

/// Source of the published IP range feed. One attempt per call, no retry.
pub trait RangeFeed {
    fn fetch_ranges(&self, url: &str) -> Result<Value, String>;
}

/// Fetches the feed over HTTP and decodes the body as JSON.
#[derive(Debug, Clone, Default)]
pub struct HttpRangeFeed {
    client: reqwest::Client,
}

impl HttpRangeFeed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RangeFeed for HttpRangeFeed {
    fn fetch_ranges(&self, url: &str) -> Result<Value, String> {
        let client = self.client.clone();
        let request_url = url.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .get(&request_url)
                    .send()
                    .await
                    .map_err(|error| {
                        format!("failed to fetch ip ranges from {request_url}: {error}")
                    })?;

                if !response.status().is_success() {
                    return Err(format!(
                        "failed to fetch ip ranges from {request_url}: HTTP status {}",
                        response.status()
                    ));
                }

                response.json::<Value>().await.map_err(|error| {
                    format!("failed to decode ip range feed from {request_url}: {error}")
                })
            })
        })
    }
}
