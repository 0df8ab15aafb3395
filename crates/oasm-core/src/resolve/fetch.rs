use std::fs;

use url::Url;

use crate::error::SpecLoadError;

/// Source of raw document text for a canonical URI.
pub trait DocumentFetcher {
    fn fetch(&self, uri: &Url) -> Result<String, SpecLoadError>;
}

/// Reads `file://` URIs from disk and `http(s)://` URIs over the network.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher;

impl DocumentFetcher for DefaultFetcher {
    fn fetch(&self, uri: &Url) -> Result<String, SpecLoadError> {
        match uri.scheme() {
            "http" | "https" => fetch_remote(uri),
            "file" => {
                let path = uri.to_file_path().map_err(|()| SpecLoadError::InvalidUri {
                    uri: uri.to_string(),
                    message: "cannot convert to a file path".to_string(),
                })?;
                log::debug!("reading {}", path.display());
                fs::read_to_string(&path).map_err(|source| SpecLoadError::Read {
                    uri: uri.to_string(),
                    source,
                })
            }
            other => Err(SpecLoadError::InvalidUri {
                uri: uri.to_string(),
                message: format!("unsupported scheme `{other}`"),
            }),
        }
    }
}

fn fetch_remote(uri: &Url) -> Result<String, SpecLoadError> {
    log::debug!("fetching {uri}");
    let fetch_error = |message: String| SpecLoadError::Fetch {
        uri: uri.to_string(),
        message,
    };
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("oasm/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fetch_error(e.to_string()))?;
    let response = client
        .get(uri.clone())
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("HTTP {status}")));
    }
    response.text().map_err(|e| fetch_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("ftp://example.com/spec.yaml").unwrap();
        let err = DefaultFetcher.fetch(&url).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme `ftp`"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.yaml")).unwrap();
        let err = DefaultFetcher.fetch(&url).unwrap_err();
        assert!(matches!(err, SpecLoadError::Read { .. }));
    }
}
