//! HTTP client for the remote dataset analysis endpoint.

use crate::CliResult;
use crate::config::ClientConfig;
use csvhealth_core::{AnalysisError, AnalysisResult, CSV_MIME, SelectedFile, parse_analysis};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::pin::Pin;

/// Multipart field carrying the CSV bytes.
pub const UPLOAD_FIELD: &str = "file";

/// Future returned by [`AnalysisClient::submit_for_analysis`].
pub type AnalysisFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AnalysisResult, AnalysisError>> + Send + 'a>>;

/// Uploads a file and returns the validated analysis.
///
/// Each call is one independent request: no retries, no caching.
pub trait AnalysisClient {
    /// Upload `file` and resolve to the validated result, or the transport
    /// or schema failure.
    fn submit_for_analysis<'a>(&'a self, file: &'a SelectedFile) -> AnalysisFuture<'a>;
}

/// Reqwest-backed analysis client.
pub struct ReqwestAnalysisClient {
    client: Client,
    endpoint: String,
}

impl ReqwestAnalysisClient {
    /// Build a client for the configured endpoint.
    pub fn new(config: &ClientConfig) -> CliResult<Self> {
        let client = Client::builder()
            .user_agent("csvhealth-cli")
            .timeout(config.timeout())
            .build()?;
        log::debug!("analysis service at {}", config.base_url());
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }
}

impl AnalysisClient for ReqwestAnalysisClient {
    fn submit_for_analysis<'a>(&'a self, file: &'a SelectedFile) -> AnalysisFuture<'a> {
        Box::pin(submit_file(&self.client, &self.endpoint, file))
    }
}

/// POST the file as multipart and validate the response body.
async fn submit_file(
    client: &Client,
    endpoint: &str,
    file: &SelectedFile,
) -> Result<AnalysisResult, AnalysisError> {
    let part = Part::bytes(file.contents().to_vec())
        .file_name(file.name().to_string())
        .mime_str(CSV_MIME)
        .map_err(transport_error)?;
    let form = Form::new().part(UPLOAD_FIELD, part);

    log::debug!("uploading {} to {endpoint}", file.name());
    let response = client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(AnalysisError::status(status.as_u16()));
    }

    let body = response.bytes().await.map_err(transport_error)?;
    Ok(parse_analysis(&body)?)
}

fn transport_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::unreachable("analysis request timed out")
    } else {
        AnalysisError::unreachable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use std::time::Duration;

    fn sample_file() -> SelectedFile {
        SelectedFile::from_bytes("sales.csv", "id,total\n1,10\n2,20\n").expect("csv")
    }

    fn client_for(server: &MockServer, timeout: Duration) -> ReqwestAnalysisClient {
        let config = ClientConfig::new(&server.base_url(), timeout).expect("config");
        ReqwestAnalysisClient::new(&config).expect("client")
    }

    #[tokio::test]
    async fn uploads_multipart_and_returns_validated_result() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/analyze_dataset/")
                    .body_contains("name=\"file\"")
                    .body_contains("filename=\"sales.csv\"")
                    .body_contains("text/csv")
                    .body_contains("id,total\n1,10\n2,20\n");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({
                        "metricas": {
                            "porcentaje_valores_faltantes": 6.3,
                            "porcentaje_filas_duplicadas": 17.1,
                            "salud_del_dataset": 76.6
                        },
                        "observaciones": [
                            {"tipo_de_reporte": "calidad", "titulo": "Nulos", "mensaje": "email vacio"}
                        ],
                        "sugerencias": []
                    }));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let file = sample_file();
        let result = client.submit_for_analysis(&file).await.expect("analysis");

        mock.assert_async().await;
        assert_eq!(result.metrics().dataset_health_percent, 76.6);
        assert_eq!(result.observations()[0].title, "Nulos");
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/analyze_dataset/");
                then.status(500).body("boom");
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let file = sample_file();
        let err = client.submit_for_analysis(&file).await.unwrap_err();

        mock.assert_hits_async(1).await;
        assert_eq!(err, AnalysisError::status(500));
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/analyze_dataset/");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({ "salud_del_dataset": "high" }));
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let file = sample_file();
        let err = client.submit_for_analysis(&file).await.unwrap_err();

        let AnalysisError::InvalidResponse(schema) = err else {
            panic!("expected invalid response, got {err:?}");
        };
        assert!(
            schema
                .issues()
                .iter()
                .any(|issue| issue.path == "$.salud_del_dataset" && issue.found == "string")
        );
    }

    #[tokio::test]
    async fn non_json_body_is_an_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/analyze_dataset/");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let file = sample_file();
        let err = client.submit_for_analysis(&file).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/analyze_dataset/");
                then.status(200).delay(Duration::from_secs(3));
            })
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let file = sample_file();
        let err = client.submit_for_analysis(&file).await.unwrap_err();

        assert_eq!(
            err,
            AnalysisError::Transport {
                status: None,
                reason: "analysis request timed out".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let config =
            ClientConfig::new("http://127.0.0.1:9", Duration::from_secs(2)).expect("config");
        let client = ReqwestAnalysisClient::new(&config).expect("client");
        let file = sample_file();
        let err = client.submit_for_analysis(&file).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Transport { status: None, .. }));
    }
}
