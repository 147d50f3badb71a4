use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use helmwatch_protocol::{
    CommandResponse, ErrorBody, FRAME_PATH, FramePayload, LOGS_PATH, LogEntry, STATS_PATH,
    StatsPayload, TEST_NOTIFICATION_PATH, TOGGLE_DETECTION_PATH, ToggleResponse,
    UPDATE_CHAT_ID_PATH, UpdateChatIdRequest,
};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::DetectionService;
use crate::errors::ServiceError;

/// [`DetectionService`] over the service's JSON HTTP API.
///
/// GET requests carry no client-side timeout; the monitor bounds each poll
/// itself. Commands time out after `command_timeout`.
#[derive(Debug, Clone)]
pub struct HttpDetectionService {
    client: reqwest::Client,
    base_url: String,
    command_timeout: Duration,
}

impl HttpDetectionService {
    pub fn new(base_url: &str, command_timeout: Duration) -> Result<Self, ServiceError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| ServiceError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServiceError::InvalidUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            command_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_body(&self, path: &str) -> Result<String, ServiceError> {
        debug!(event = "core.service.request_started", method = "GET", path = path);
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(|e| transport_error(e, None))?;
        read_body(response, None).await
    }

    async fn post_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ServiceError> {
        debug!(event = "core.service.request_started", method = "POST", path = path);
        let request = self
            .client
            .post(self.endpoint(path))
            .timeout(self.command_timeout);
        let request = match body {
            Some(body) => request.json(body),
            None => request.header(CONTENT_TYPE, "application/json"),
        };
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, Some(self.command_timeout)))?;
        read_body(response, Some(self.command_timeout)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let body = self.get_body(path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_command<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ServiceError> {
        let body = self.post_body(path, body).await?;
        let response: CommandResponse = serde_json::from_str(&body)?;
        response.into_result().map_err(ServiceError::Remote)?;
        Ok(body)
    }
}

impl DetectionService for HttpDetectionService {
    fn fetch_frame(&self) -> BoxFuture<'_, Result<FramePayload, ServiceError>> {
        async move {
            let payload: FramePayload = self.get_json(FRAME_PATH).await?;
            if let Some(error) = payload.logical_error() {
                return Err(ServiceError::Remote(error.to_string()));
            }
            Ok(payload)
        }
        .boxed()
    }

    fn fetch_logs(&self) -> BoxFuture<'_, Result<Vec<LogEntry>, ServiceError>> {
        self.get_json(LOGS_PATH).boxed()
    }

    fn fetch_stats(&self) -> BoxFuture<'_, Result<StatsPayload, ServiceError>> {
        self.get_json(STATS_PATH).boxed()
    }

    fn toggle_detection(&self) -> BoxFuture<'_, Result<ToggleResponse, ServiceError>> {
        async move {
            let body = self.post_body::<()>(TOGGLE_DETECTION_PATH, None).await?;
            // The toggle answers `{detection_active}`; `success` only shows up on failure.
            if let Ok(response) = serde_json::from_str::<CommandResponse>(&body) {
                response.into_result().map_err(ServiceError::Remote)?;
            }
            Ok(serde_json::from_str(&body)?)
        }
        .boxed()
    }

    fn test_notification(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        async move {
            self.post_command::<()>(TEST_NOTIFICATION_PATH, None)
                .await
                .map(|_| ())
        }
        .boxed()
    }

    fn update_chat_id<'a>(&'a self, chat_id: &'a str) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            let request = UpdateChatIdRequest {
                chat_id: chat_id.to_string(),
            };
            self.post_command(UPDATE_CHAT_ID_PATH, Some(&request))
                .await
                .map(|_| ())
        }
        .boxed()
    }
}

/// Read the body, turning non-2xx statuses into [`ServiceError::Http`].
///
/// The service reports 2xx-with-`success: false` for logical failures and
/// 4xx/5xx with `{"error": ...}` otherwise; the error text is kept if present.
async fn read_body(
    response: reqwest::Response,
    timeout: Option<Duration>,
) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.error)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        debug!(
            event = "core.service.request_failed",
            status = status.as_u16(),
            message = %message,
        );
        return Err(ServiceError::Http {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

fn transport_error(error: reqwest::Error, timeout: Option<Duration>) -> ServiceError {
    match timeout {
        Some(after) if error.is_timeout() => ServiceError::Timeout {
            after_ms: after.as_millis() as u64,
        },
        _ => ServiceError::Transport(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_url() {
        let err = HttpDetectionService::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = HttpDetectionService::new("ftp://camera", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let service =
            HttpDetectionService::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            service.endpoint(FRAME_PATH),
            "http://127.0.0.1:5000/api/frame"
        );
    }
}
