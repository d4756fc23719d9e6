//! Retrieval of the CSV export over HTTP or from disk.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use tracing::debug;

use crate::error::FetchError;

/// `true` when `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// GETs `url` and returns the body as text. Non-2xx statuses are errors.
pub async fn fetch_text<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<String, FetchError> {
    let parsed: reqwest::Url = url
        .parse()
        .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    let body = resp.text().await?;
    debug!(bytes = body.len(), "Export body received");
    Ok(body)
}

/// Loads an export from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient + ?Sized>(
    client: &C,
    source: &str,
) -> Result<String, FetchError> {
    if is_remote(source) {
        fetch_text(client, source).await
    } else {
        Ok(tokio::fs::read_to_string(source).await?)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubClient;
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://docs.google.com/x"));
        assert!(is_remote("http://localhost:8080/x.csv"));
        assert!(!is_remote("data/responses.csv"));
        assert!(!is_remote("httpdata.csv"));
    }

    #[tokio::test]
    async fn test_fetch_text_ok() {
        let client = StubClient::ok("name,email\n");
        let body = fetch_text(&client, "https://example.com/export").await.unwrap();
        assert_eq!(body, "name,email\n");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_text_non_success_status() {
        let client = StubClient::status(403);
        let err = fetch_text(&client, "https://example.com/export")
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 403),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_text_invalid_url() {
        let client = StubClient::ok("");
        let err = fetch_text(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_load_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "name\nJane\n").unwrap();

        let client = StubClient::ok("unused");
        let body = load_source(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(body, "name\nJane\n");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_load_source_missing_file() {
        let client = StubClient::ok("");
        let err = load_source(&client, "/no/such/export.csv").await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
