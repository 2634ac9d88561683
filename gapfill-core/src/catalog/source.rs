use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::CatalogError;

/// Where the drivers table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Remote(Url),
    Local(PathBuf),
}

impl CatalogSource {
    /// Accepts `http(s)://` and `file://` URLs or a plain filesystem path.
    pub fn from_location(location: &str) -> Result<Self, CatalogError> {
        let location = location.trim();
        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::Local)
                    .map_err(|_| {
                        CatalogError::UnsupportedLocation(location.to_string())
                    }),
                _ => Err(CatalogError::UnsupportedLocation(location.to_string())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Self::Local(PathBuf::from(location)))
            }
            Err(_) => Err(CatalogError::UnsupportedLocation(location.to_string())),
        }
    }

    pub(super) async fn fetch(
        &self,
        client: &reqwest::Client,
    ) -> Result<String, CatalogError> {
        match self {
            Self::Remote(url) => {
                let fetch_err = |source| CatalogError::Fetch {
                    url: url.to_string(),
                    source,
                };
                let response =
                    client.get(url.clone()).send().await.map_err(fetch_err)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                response.text().await.map_err(fetch_err)
            }
            Self::Local(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_locations() {
        assert!(matches!(
            CatalogSource::from_location(
                "https://raw.githubusercontent.com/ooi-integration/ingestion-csvs/master/cabled_drivers_list.txt"
            ),
            Ok(CatalogSource::Remote(_))
        ));
        assert_eq!(
            CatalogSource::from_location("fixtures/drivers.txt").unwrap(),
            CatalogSource::Local(PathBuf::from("fixtures/drivers.txt"))
        );
        assert!(matches!(
            CatalogSource::from_location("ftp://example.org/drivers.txt"),
            Err(CatalogError::UnsupportedLocation(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_become_paths() {
        assert_eq!(
            CatalogSource::from_location("file:///etc/drivers.txt").unwrap(),
            CatalogSource::Local(PathBuf::from("/etc/drivers.txt"))
        );
    }
}
