//! Probes a running relay, used by `gruda check`.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

/// Endpoints probed, with a label for each.
pub const PROBES: [(&str, &str); 2] = [("Server Status", "/health"), ("API Status", "/api/status")];

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct ProbeResult {
    pub name: &'static str,
    pub url: String,
    pub outcome: ProbeOutcome,
}

#[derive(Debug)]
pub enum ProbeOutcome {
    Healthy {
        status: u16,
        /// `status` field of the JSON body, when present.
        reported: Option<String>,
    },
    /// Answered with a redirect or client error.
    Warning {
        status: u16,
    },
    /// Answered with a server error.
    Unhealthy {
        status: u16,
    },
    Unreachable {
        error: String,
    },
}

impl ProbeResult {
    pub fn is_healthy(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Healthy { .. })
    }
}

/// Run every probe against `base_url`, one after another.
pub async fn run_checks(client: &Client, base_url: &str) -> Vec<ProbeResult> {
    let base = base_url.trim_end_matches('/');
    let mut results = Vec::with_capacity(PROBES.len());

    for (name, path) in PROBES {
        let url = format!("{base}{path}");
        let outcome = probe(client, &url).await;
        results.push(ProbeResult { name, url, outcome });
    }
    results
}

async fn probe(client: &Client, url: &str) -> ProbeOutcome {
    let response = match client.get(url).timeout(PROBE_TIMEOUT).send().await {
        Ok(r) => r,
        Err(e) => {
            return ProbeOutcome::Unreachable {
                error: e.to_string(),
            };
        }
    };

    let status = response.status().as_u16();
    if response.status().is_server_error() {
        return ProbeOutcome::Unhealthy { status };
    }
    if status != 200 {
        return ProbeOutcome::Warning { status };
    }

    let reported = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("status").and_then(Value::as_str).map(String::from));
    ProbeOutcome::Healthy { status, reported }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn all_probes_healthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})),
            )
            .mount(&server)
            .await;

        let results = run_checks(&Client::new(), &format!("{}/", server.uri())).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(ProbeResult::is_healthy));
        assert!(matches!(
            &results[0].outcome,
            ProbeOutcome::Healthy { reported: Some(s), .. } if s == "healthy"
        ));
        assert!(matches!(
            results[1].outcome,
            ProbeOutcome::Healthy { reported: None, .. }
        ));
    }

    #[tokio::test]
    async fn non_200_is_warning() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let results = run_checks(&Client::new(), &server.uri()).await;
        assert!(
            results
                .iter()
                .all(|r| matches!(r.outcome, ProbeOutcome::Warning { status: 404 }))
        );
    }

    #[tokio::test]
    async fn server_error_is_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(301))
            .mount(&server)
            .await;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        let results = run_checks(&client, &server.uri()).await;

        assert!(matches!(
            results[0].outcome,
            ProbeOutcome::Unhealthy { status: 503 }
        ));
        assert!(matches!(
            results[1].outcome,
            ProbeOutcome::Warning { status: 301 }
        ));
        assert_eq!(results[0].url, format!("{}/health", server.uri()));
        assert!(results.iter().all(|r| !r.is_healthy()));
    }

    #[tokio::test]
    async fn unreachable_server() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let results = run_checks(&Client::new(), "http://127.0.0.1:9").await;
        assert!(
            results
                .iter()
                .all(|r| matches!(r.outcome, ProbeOutcome::Unreachable { .. }))
        );
    }
}
