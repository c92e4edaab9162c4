use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::state::{Todo, TodoId};

#[derive(Serialize)]
struct NewTodoRequest<'a> {
    task: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// HTTP client for the todo and chat endpoints.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_todos(&self) -> BackendResult<Vec<Todo>> {
        let url = format!("{}/todos", self.base_url);
        debug!(%url, "listing todos");

        let response = self.client.get(&url).send().await;
        let response = check(&url, response).await?;
        decode(&url, response).await
    }

    pub async fn create_todo(&self, task: &str) -> BackendResult<Todo> {
        let url = format!("{}/todos", self.base_url);
        debug!(%url, "creating todo");

        let response = self
            .client
            .post(&url)
            .json(&NewTodoRequest { task })
            .send()
            .await;
        let response = check(&url, response).await?;
        decode(&url, response).await
    }

    /// The response body, if any, is ignored.
    pub async fn delete_todo(&self, id: &TodoId) -> BackendResult<()> {
        let url = format!("{}/todos/{}", self.base_url, id);
        debug!(%url, "deleting todo");

        let response = self.client.delete(&url).send().await;
        check(&url, response).await?;
        Ok(())
    }

    /// Posts a user message and returns the bot's reply text.
    pub async fn chat(&self, message: &str) -> BackendResult<String> {
        let url = format!("{}/chat", self.base_url);
        debug!(%url, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await;
        let response = check(&url, response).await?;
        let chat: ChatResponse = decode(&url, response).await?;
        Ok(chat.response)
    }
}

async fn check(url: &str, response: reqwest::Result<Response>) -> BackendResult<Response> {
    let response = response.map_err(|source| BackendError::Transport {
        url: url.to_string(),
        source,
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            url: url.to_string(),
            status,
            body,
        });
    }

    Ok(response)
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> BackendResult<T> {
    response.json().await.map_err(|source| BackendError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000//");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
