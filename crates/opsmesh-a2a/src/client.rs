//! Client - submit a message to a peer agent and wait for its answer
//!
//! The peer answers `message/send` either with a direct message or with a
//! task handle. Tasks are polled with `tasks/get` on a fixed interval until
//! they complete, fail, or the polling budget runs out. Individual poll
//! failures are tolerated; only the exhausted budget is a timeout.

use crate::error::{Error, Result};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, Task, TaskState};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Default interval between task polls
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default number of polls before giving up
const MAX_POLLS: u32 = 30;

/// JSON-RPC client for one peer agent endpoint
#[derive(Debug, Clone)]
pub struct A2aClient {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    poll_interval: Duration,
    max_polls: u32,
}

impl A2aClient {
    /// Create a client for one peer endpoint
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            request_timeout: REQUEST_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        }
    }

    /// Override the per-request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the interval between task polls
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the number of polls before giving up
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// The peer endpoint this client talks to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one text message and wait for the peer's textual answer.
    ///
    /// # Errors
    /// Returns `Error::Transport` when the peer is unreachable,
    /// `Error::Malformed` when the response has no recognizable shape,
    /// `Error::TaskFailed` when the remote task ends in the failed state,
    /// and `Error::Timeout` when the polling budget is exhausted.
    #[instrument(skip(self, text), fields(endpoint = %self.endpoint))]
    pub async fn send_text(&self, text: &str) -> Result<String> {
        let response = self.post(&JsonRpcRequest::message_send(text)).await?;

        if let Some(rpc_error) = response.error {
            return Err(Error::Transport {
                endpoint: self.endpoint.clone(),
                message: format!("JSON-RPC error {}: {}", rpc_error.code, rpc_error.message),
            });
        }

        let Some(result) = response.result else {
            return Err(Error::Malformed {
                endpoint: self.endpoint.clone(),
                message: "response carried neither result nor error".to_string(),
            });
        };

        // Any result carrying a task id means the peer works
        // asynchronously; poll it. Status may or may not be included.
        if let Some(task_id) = result.get("id").and_then(|v| v.as_str()) {
            debug!(task_id, "Peer returned a task, polling for completion");
            return self.wait_for_completion(task_id).await;
        }

        // A direct message carries its parts inline.
        if let Some(parts) = result.get("parts").and_then(|v| v.as_array()) {
            for part in parts {
                let tagged_text = part.get("kind").and_then(|v| v.as_str()) == Some("text")
                    || part.get("type").and_then(|v| v.as_str()) == Some("text");
                if tagged_text {
                    if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                        return Ok(text.to_string());
                    }
                }
            }
        }

        let mut raw = result.to_string();
        raw.truncate(500);
        Err(Error::Malformed {
            endpoint: self.endpoint.clone(),
            message: format!("could not extract content, raw result: {raw}"),
        })
    }

    /// Poll `tasks/get` until the task reaches a terminal state.
    async fn wait_for_completion(&self, task_id: &str) -> Result<String> {
        for attempt in 0..self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let response = match self.post(&JsonRpcRequest::tasks_get(task_id)).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(task_id, attempt, error = %e, "Task poll failed, retrying");
                    continue;
                }
            };

            let Some(result) = response.result else {
                continue;
            };
            let Ok(task) = serde_json::from_value::<Task>(result) else {
                continue;
            };

            match task.status.state {
                TaskState::Completed => {
                    return Ok(task
                        .first_text()
                        .unwrap_or("Task completed but no response found")
                        .to_string());
                }
                TaskState::Failed => {
                    return Err(Error::TaskFailed {
                        endpoint: self.endpoint.clone(),
                        message: task.status.message_text(),
                    });
                }
                _ => {
                    debug!(task_id, attempt, state = ?task.status.state, "Task still in flight");
                }
            }
        }

        Err(Error::Timeout {
            endpoint: self.endpoint.clone(),
        })
    }

    async fn post(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Transport {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            })?;

        response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| Error::Malformed {
                endpoint: self.endpoint.clone(),
                message: e.to_string(),
            })
    }
}
