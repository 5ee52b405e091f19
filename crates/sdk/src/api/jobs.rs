//! Jobs API and the execution polling loop.

use crate::client::RedashClient;
use crate::config::PollOptions;
use crate::error::{RedashError, RedashResult};
use crate::types::{Job, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Jobs API for inspecting asynchronous query executions.
pub struct JobsApi<'a> {
    client: &'a RedashClient,
}

impl<'a> JobsApi<'a> {
    pub(crate) fn new(client: &'a RedashClient) -> Self {
        Self { client }
    }

    /// Get the current state of a job.
    pub async fn get(&self, job_id: &str) -> RedashResult<Job> {
        let response: JobResponse = self
            .client
            .http
            .get(&format!("/api/jobs/{}", job_id))
            .await?;
        Ok(response.job)
    }

    /// Turn the response of an execution request into a result, polling the
    /// job if the upstream did not answer synchronously.
    pub async fn resolve(
        &self,
        response: ExecutionResponse,
        poll: PollOptions,
    ) -> RedashResult<QueryResult> {
        match response {
            ExecutionResponse {
                job: Some(job), ..
            } => self.wait_for_result(&job.id, poll).await,
            ExecutionResponse {
                query_result: Some(result),
                ..
            } => Ok(result),
            _ => Err(RedashError::QueryExecution(
                "response contained neither a job nor a query result".to_string(),
            )),
        }
    }

    /// Poll a job until it completes, fails, or `poll.timeout` elapses.
    ///
    /// Errors from the status request itself end the wait immediately.
    pub async fn wait_for_result(
        &self,
        job_id: &str,
        poll: PollOptions,
    ) -> RedashResult<QueryResult> {
        let started = Instant::now();

        loop {
            if started.elapsed() > poll.timeout {
                warn!(job_id, timeout_ms = poll.timeout.as_millis() as u64, "Job polling timed out");
                return Err(RedashError::QueryExecutionTimeout {
                    timeout_ms: poll.timeout.as_millis() as u64,
                });
            }

            let job = self.get(job_id).await?;
            debug!(
                job_id,
                status = job.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Polled job"
            );

            if job.is_success() {
                info!(job_id, elapsed_ms = started.elapsed().as_millis() as u64, "Job completed");
                return self.completed_result(job).await;
            }

            if job.is_failure() {
                let message = job
                    .error_message()
                    .unwrap_or("no error details reported")
                    .to_string();
                warn!(job_id, error = %message, "Job failed");
                return Err(RedashError::QueryExecution(message));
            }

            tokio::time::sleep(poll.interval).await;
        }
    }

    async fn completed_result(&self, job: Job) -> RedashResult<QueryResult> {
        if let Some(result_id) = job.query_result_id {
            return self.client.query_results().get(result_id).await;
        }

        match job.result {
            // Finished jobs report the stored result id in `result`.
            Some(Value::Number(n)) => match n.as_i64() {
                Some(result_id) => self.client.query_results().get(result_id).await,
                None => Err(RedashError::QueryExecution(format!(
                    "job {} reported an invalid result id: {}",
                    job.id, n
                ))),
            },
            Some(Value::Null) | None => Err(RedashError::QueryExecution(format!(
                "job {} completed without a result",
                job.id
            ))),
            Some(inline) => Ok(serde_json::from_value(inline)?),
        }
    }
}

/// Body returned by the execution endpoints: either a job handle or a result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_result: Option<QueryResult>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JobResponse {
    job: Job,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INTERVAL: Duration = Duration::from_millis(20);

    fn job(status: i32) -> serde_json::Value {
        json!({"job": {"id": "job-1", "status": status, "error": ""}})
    }

    async fn mount_statuses(server: &MockServer, running: u64, terminal: serde_json::Value) {
        if running > 0 {
            Mock::given(method("GET"))
                .and(path("/api/jobs/job-1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(job(1)))
                .up_to_n_times(running)
                .with_priority(1)
                .mount(server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path("/api/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(terminal))
            .with_priority(2)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_completes_after_three_running_polls() {
        let server = MockServer::start().await;
        mount_statuses(
            &server,
            3,
            json!({"job": {"id": "job-1", "status": 3, "query_result_id": 99}}),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/query_results/99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query_result": {
                    "id": 99,
                    "query": "SELECT 1",
                    "data": {"columns": [{"name": "x", "type": "integer"}], "rows": [{"x": 1}]},
                    "runtime": 0.01
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let started = std::time::Instant::now();
        let result = client
            .jobs()
            .wait_for_result("job-1", PollOptions::new(INTERVAL, Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(started.elapsed() >= INTERVAL * 3);
        assert_eq!(result.id(), Some(99));
        assert_eq!(result.rows()[0]["x"], json!(1));
        let polls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/api/jobs/job-1")
            .count();
        assert_eq!(polls, 4);
    }

    #[tokio::test]
    async fn test_failure_status_stops_polling() {
        let server = MockServer::start().await;
        mount_statuses(
            &server,
            1,
            json!({"job": {"id": "job-1", "status": 4, "error": "relation \"foo\" does not exist"}}),
        )
        .await;

        let client = client_for(&server);
        let started = std::time::Instant::now();
        let err = client
            .jobs()
            .wait_for_result("job-1", PollOptions::new(INTERVAL, Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(started.elapsed() >= INTERVAL);
        assert!(
            matches!(err, RedashError::QueryExecution(ref m) if m == "relation \"foo\" does not exist")
        );
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_error_text_uses_placeholder() {
        let server = MockServer::start().await;
        mount_statuses(&server, 0, job(4)).await;

        let client = client_for(&server);
        let err = client
            .jobs()
            .wait_for_result("job-1", client.poll_options())
            .await
            .unwrap_err();

        assert!(matches!(err, RedashError::QueryExecution(ref m) if m == "no error details reported"));
        assert_eq!(
            err.to_string(),
            "Query execution failed: no error details reported"
        );
    }

    #[tokio::test]
    async fn test_never_terminal_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/jobs/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job(2)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .jobs()
            .wait_for_result(
                "job-1",
                PollOptions::new(INTERVAL, Duration::from_millis(150)),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RedashError::QueryExecutionTimeout { timeout_ms: 150 }
        ));
    }

    #[tokio::test]
    async fn test_status_request_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/jobs/job-1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .jobs()
            .wait_for_result("job-1", client.poll_options())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_inline_result_returned_directly() {
        let server = MockServer::start().await;
        mount_statuses(
            &server,
            0,
            json!({"job": {"id": "job-1", "status": 3, "result": {
                "query_hash": "abc",
                "data": {"columns": [], "rows": []},
                "runtime": 0.5
            }}}),
        )
        .await;

        let client = client_for(&server);
        let result = client
            .jobs()
            .wait_for_result("job-1", client.poll_options())
            .await
            .unwrap();

        assert_eq!(result.query_hash(), Some("abc"));
        assert_eq!(result.runtime(), Some(0.5));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_numeric_result_fetches_stored_result() {
        let server = MockServer::start().await;
        mount_statuses(
            &server,
            0,
            json!({"job": {"id": "job-1", "status": 3, "result": 7}}),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/query_results/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query_result": {"id": 7, "data": {"columns": [], "rows": []}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .jobs()
            .wait_for_result("job-1", client.poll_options())
            .await
            .unwrap();

        assert_eq!(result.id(), Some(7));
    }

    #[tokio::test]
    async fn test_resolve_without_job_or_result_fails() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client
            .jobs()
            .resolve(ExecutionResponse::default(), client.poll_options())
            .await
            .unwrap_err();

        assert!(matches!(err, RedashError::QueryExecution(_)));
    }
}
