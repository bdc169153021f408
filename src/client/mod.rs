//! Resource clients for both API generations.
//!
//! [`PlazaApi`] talks XML to the Plaza API and signs every request; [`RetailerApi`] talks JSON
//! to the Retailer API with a bearer token. Both run each call through the same steps: build
//! the request, send it over a [`Transport`](crate::transport::Transport), turn non-2xx
//! answers into [`ApiError::Marketplace`] and map the body with the resource's schema.

use tracing::{debug, warn};
use url::Url;

use crate::{
    document::RawDocument,
    error::{ApiError, DocumentFormat, MarketplaceError, Result, Violation},
    mapping::{MappedObject, Schema, map_document},
    schemas,
    transport::TransportResponse,
};

pub mod plaza;
pub mod retailer;
mod status;

pub use plaza::PlazaApi;
pub use retailer::RetailerApi;
pub use status::{ProcessLink, ProcessStatus, TransporterCode};

/// Which API a response came from; decides the body format and the error schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Generation {
    Plaza,
    Retailer,
}

impl Generation {
    const fn format(self) -> DocumentFormat {
        match self {
            Self::Plaza => DocumentFormat::Xml,
            Self::Retailer => DocumentFormat::Json,
        }
    }

    fn parse(self, body: &[u8]) -> Result<RawDocument> {
        match self.format() {
            DocumentFormat::Xml => RawDocument::parse_xml(body),
            DocumentFormat::Json => RawDocument::parse_json(body),
        }
    }

    /// Maps a successful response with `schema`, or turns a non-2xx one into an error.
    pub(crate) fn read(self, schema: &'static Schema, response: &TransportResponse) -> Result<MappedObject> {
        if !response.is_success() {
            return Err(self.marketplace_error(response));
        }
        let document = self.parse(&response.body)?;
        let object = map_document(schema, &document)?;
        debug!(entity = schema.entity, fields = object.len(), "response mapped");
        Ok(object)
    }

    /// Builds the error for a non-2xx response.
    ///
    /// The body is read with the generation's error schema. When it does not parse or carries
    /// no description, the raw body becomes the description.
    pub(crate) fn marketplace_error(self, response: &TransportResponse) -> ApiError {
        let raw = String::from_utf8_lossy(&response.body).trim().to_owned();
        let mut error = MarketplaceError { status: response.status, ..MarketplaceError::default() };

        let parsed = self.parse(&response.body).ok().and_then(|document| match self {
            Self::Plaza => map_document(&schemas::plaza::ERROR_RESPONSE, &document).ok(),
            Self::Retailer => map_document(&schemas::retailer::PROBLEM, &document).ok(),
        });

        if let Some(body) = parsed {
            match self {
                Self::Plaza => {
                    error.code = body.text_lossy("ErrorCode");
                    error.description = body
                        .text("ErrorMessage")
                        .or_else(|| body.text("Message"))
                        .unwrap_or_default()
                        .to_owned();
                }
                Self::Retailer => {
                    error.code = body.text("title").map(str::to_owned);
                    error.description = body
                        .text("detail")
                        .or_else(|| body.text("title"))
                        .unwrap_or_default()
                        .to_owned();
                    error.violations = body
                        .objects("violations")
                        .map(|violation| Violation {
                            name: violation.text("name").unwrap_or_default().to_owned(),
                            reason: violation.text("reason").unwrap_or_default().to_owned(),
                        })
                        .collect();
                }
            }
        }

        if error.description.is_empty() {
            error.description = raw;
        }

        warn!(status = error.status, code = ?error.code, "marketplace rejected request");
        ApiError::Marketplace(error)
    }
}

/// Appends `path` to `base`, keeping any path prefix the base already has.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url> {
    let joined = format!("{}{path}", base.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| ApiError::InvalidInput(format!("invalid endpoint {joined}: {e}")))
}

/// Validates an identifier before it is templated into a URL path.
pub(crate) fn path_segment<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let valid = !value.is_empty()
        && !value.contains("..")
        && value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(value)
    } else {
        Err(ApiError::InvalidInput(format!("invalid {name}: {value:?}")))
    }
}
