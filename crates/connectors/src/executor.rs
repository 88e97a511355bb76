// Retrying executor for remote calls

use crate::request::{RequestBody, RequestSpec};
use formflux_core::application::retry::{run_with_retry, CallFailure, FailureKind, RetryPolicy};
use serde_json::{json, Value};
use tracing::debug;

/// Executes remote calls described by `RequestSpec` under a retry policy.
///
/// The contract mirrors the catalog port: every obtained response is a
/// success at this layer and is returned as `(payload, Some(status))`,
/// whatever the status code. Only transport failures are classified and
/// retried; once retries are exhausted the failure is folded into an
/// error payload with `None` for the status.
pub struct RemoteCallExecutor {
    client: reqwest::Client,
}

impl RemoteCallExecutor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn execute(&self, spec: &RequestSpec, policy: &RetryPolicy) -> (Value, Option<u16>) {
        let result = run_with_retry(policy, || self.send_once(spec)).await;
        match result {
            Ok((payload, status)) => (payload, Some(status)),
            Err(failure) => (
                json!({"error": {"message": failure.message}}),
                None,
            ),
        }
    }

    async fn send_once(&self, spec: &RequestSpec) -> Result<(Value, u16), CallFailure> {
        let mut request = self
            .client
            .request(spec.method.clone(), &spec.url)
            .timeout(spec.timeout);

        for (name, value) in &spec.headers {
            request = request.header(name, value);
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        request = match &spec.body {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::Bytes(bytes, content_type)) => request
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes.clone()),
            None => request,
        };

        debug!(method = %spec.method, url = %spec.url, "Remote call attempt");
        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        debug!(method = %spec.method, url = %spec.url, status = %status, "Remote call completed");

        let payload = response.json::<Value>().await.map_err(classify)?;
        Ok((payload, status))
    }
}

impl Default for RemoteCallExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(error: reqwest::Error) -> CallFailure {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_decode() {
        FailureKind::Decode
    } else {
        FailureKind::Other
    };
    CallFailure::new(kind, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Exercises the full transport path against a port nothing listens on;
    // connect failures are not retryable under a timeout-only policy
    #[tokio::test]
    async fn test_unreachable_host_folds_into_error_payload() {
        let executor = RemoteCallExecutor::new();
        let spec = RequestSpec::get("http://127.0.0.1:1/nope").timeout(Duration::from_secs(2));
        let (payload, status) = executor.execute(&spec, &RetryPolicy::on_timeout(2)).await;

        assert_eq!(status, None);
        assert!(payload["error"]["message"].as_str().is_some());
    }
}
