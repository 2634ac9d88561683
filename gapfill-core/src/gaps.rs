//! Gap resolution against the external availability service.

use async_trait::async_trait;
use gapfill_model::{GapInterval, InstrumentRef};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::GapReportError;

/// Raw `(start, end)` timestamp pair as reported, unordered and unvalidated.
pub type RawGap = (String, String);

/// External service that knows which instruments a server carries and where
/// their data is missing.
#[async_trait]
pub trait GapReporter: Send + Sync {
    /// Every reference designator the server knows about.
    async fn instruments(
        &self,
        server: &str,
    ) -> Result<Vec<String>, GapReportError>;

    /// Missing date ranges for one instrument.
    async fn missing_ranges(
        &self,
        instrument: &InstrumentRef,
        server: &str,
    ) -> Result<Vec<RawGap>, GapReportError>;
}

/// Placeholder substituted with the server address in URL templates.
pub const SERVER_PLACEHOLDER: &str = "{server}";
/// Placeholder substituted with the reference designator in URL templates.
pub const REFDES_PLACEHOLDER: &str = "{refdes}";

/// JSON-over-HTTP gap reporter.
///
/// The inventory endpoint answers with a JSON array of designator strings and
/// the missing-ranges endpoint with a JSON array of `[start, end]` pairs.
#[derive(Debug, Clone)]
pub struct HttpGapReporter {
    client: reqwest::Client,
    inventory_url: String,
    missing_url: String,
}

impl HttpGapReporter {
    pub fn new(
        client: reqwest::Client,
        inventory_url: impl Into<String>,
        missing_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            inventory_url: inventory_url.into(),
            missing_url: missing_url.into(),
        }
    }

    fn render(template: &str, server: &str, refdes: Option<&str>) -> String {
        let url = template.replace(SERVER_PLACEHOLDER, server);
        match refdes {
            Some(refdes) => url.replace(REFDES_PLACEHOLDER, refdes),
            None => url,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, GapReportError> {
        let response = self.client.get(&url).send().await.map_err(|source| {
            GapReportError::Http {
                url: url.clone(),
                source,
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GapReportError::Status { url, status });
        }
        let body = response.text().await.map_err(|source| {
            GapReportError::Http {
                url: url.clone(),
                source,
            }
        })?;
        serde_json::from_str(&body).map_err(|err| GapReportError::Decode {
            url,
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl GapReporter for HttpGapReporter {
    async fn instruments(
        &self,
        server: &str,
    ) -> Result<Vec<String>, GapReportError> {
        let url = Self::render(&self.inventory_url, server, None);
        self.get_json(url).await
    }

    async fn missing_ranges(
        &self,
        instrument: &InstrumentRef,
        server: &str,
    ) -> Result<Vec<RawGap>, GapReportError> {
        let url =
            Self::render(&self.missing_url, server, Some(instrument.as_str()));
        self.get_json(url).await
    }
}

/// Turns reporter output into ordered, validated gap intervals.
#[derive(Debug)]
pub struct GapResolver<'a, R: ?Sized> {
    reporter: &'a R,
}

impl<'a, R: GapReporter + ?Sized> GapResolver<'a, R> {
    pub fn new(reporter: &'a R) -> Self {
        Self { reporter }
    }

    /// Gaps for `instrument`, in reporter order.
    ///
    /// Malformed pairs are dropped with a warning. A reporter failure is
    /// logged and yields no gaps so sibling instruments carry on.
    pub async fn resolve(
        &self,
        instrument: &InstrumentRef,
        server: &str,
    ) -> Vec<GapInterval> {
        let raw = match self.reporter.missing_ranges(instrument, server).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%instrument, error = %err, "gap report failed");
                return Vec::new();
            }
        };
        let gaps = normalize(instrument, &raw);
        debug!(
            %instrument,
            reported = raw.len(),
            usable = gaps.len(),
            "resolved gaps"
        );
        gaps
    }
}

/// Parse and order each raw pair independently; no merging of overlaps.
pub fn normalize(instrument: &InstrumentRef, raw: &[RawGap]) -> Vec<GapInterval> {
    raw.iter()
        .filter_map(|(start, end)| match GapInterval::parse(start, end) {
            Ok(gap) => Some(gap),
            Err(err) => {
                warn!(
                    %instrument,
                    start = %start,
                    end = %end,
                    error = %err,
                    "discarding malformed gap"
                );
                None
            }
        })
        .collect()
}
