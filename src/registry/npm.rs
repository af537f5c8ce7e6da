use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::analyzer::walker::parse_identifier;
use crate::models::PackageInfo;
use crate::source::{MetadataSource, SourceError};

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Metadata source backed by the npm registry HTTP API.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: Client,
    base_url: String,
}

impl NpmRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("yarn-licensed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MetadataSource for NpmRegistry {
    async fn package_info(&self, id: &str) -> Result<Option<PackageInfo>, SourceError> {
        let (name, version) = parse_identifier(id);
        let url = package_url(&self.base_url, name, version);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        // GET /{name}/{version} returns the version manifest, which carries
        // `description` and `homepage` at the top level.
        let info: PackageInfo = response.json().await?;
        Ok(Some(info))
    }
}

/// Build `{base}/{name}/{version}`; without a version, ask for `latest`.
/// Scoped packages need URL encoding: @scope/pkg → %40scope%2Fpkg
fn package_url(base_url: &str, name: &str, version: Option<&str>) -> String {
    let encoded_name = name.replace('@', "%40").replace('/', "%2F");
    format!("{}/{}/{}", base_url, encoded_name, version.unwrap_or("latest"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_url() {
        assert_eq!(
            package_url(DEFAULT_REGISTRY, "left-pad", Some("1.3.0")),
            "https://registry.npmjs.org/left-pad/1.3.0"
        );
        assert_eq!(
            package_url(DEFAULT_REGISTRY, "@babel/core", Some("7.24.0")),
            "https://registry.npmjs.org/%40babel%2Fcore/7.24.0"
        );
        assert_eq!(
            package_url("http://localhost:4873", "left-pad", None),
            "http://localhost:4873/left-pad/latest"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let registry = NpmRegistry::new("http://localhost:4873/", Duration::from_secs(1)).unwrap();
        assert_eq!(registry.base_url, "http://localhost:4873");
    }

    #[test]
    fn test_version_manifest_deserializes() {
        let body = r#"{"name":"left-pad","version":"1.3.0","description":"String left pad","homepage":"https://github.com/stevemao/left-pad#readme","license":"WTFPL"}"#;
        let info: PackageInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.description.as_deref(), Some("String left pad"));
        assert!(!info.is_empty());
    }

    /// Answer a single HTTP request with `status` and `body`; returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_not_found_is_no_data() {
        let base = serve_once("404 Not Found", r#"{"error":"Not found"}"#).await;
        let registry = NpmRegistry::new(&base, Duration::from_secs(5)).unwrap();

        let info = registry.package_info("missing-pkg@1.0.0").await.unwrap();
        assert_eq!(info, None);
    }

    #[tokio::test]
    async fn test_version_manifest_is_returned() {
        let base = serve_once(
            "200 OK",
            r#"{"name":"left-pad","version":"1.3.0","description":"String left pad","homepage":"https://github.com/stevemao/left-pad#readme"}"#,
        )
        .await;
        let registry = NpmRegistry::new(&base, Duration::from_secs(5)).unwrap();

        let info = registry.package_info("left-pad@1.3.0").await.unwrap().unwrap();
        assert_eq!(info.description.as_deref(), Some("String left pad"));
        assert_eq!(
            info.homepage.as_deref(),
            Some("https://github.com/stevemao/left-pad#readme")
        );
    }
}
