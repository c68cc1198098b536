//! Absolute http(s) URLs (profile images, uploaded post images)

use url::Url;

use super::ValidationError;

/// Maximum stored URL length
const MAX_URL_LEN: usize = 2048;

/// Validated absolute `http`/`https` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl(Url);

impl HttpUrl {
    /// Parse and validate a URL.
    ///
    /// # Example
    /// ```
    /// use simfluence_server::models::HttpUrl;
    ///
    /// assert!(HttpUrl::new("postUrl", "https://res.cloudinary.com/x/image.png").is_ok());
    /// assert!(HttpUrl::new("postUrl", "ftp://example.com/a").is_err());
    /// assert!(HttpUrl::new("postUrl", "not a url").is_err());
    /// ```
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        if s.len() > MAX_URL_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_URL_LEN,
            });
        }

        let url = Url::parse(s).map_err(|_| ValidationError::InvalidFormat {
            field,
            reason: "must be an absolute URL",
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            _ => Err(ValidationError::InvalidFormat {
                field,
                reason: "must use http or https",
            }),
        }
    }

    /// Validate an optional URL; blank input counts as absent.
    pub fn optional(field: &'static str, s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::new(field, s).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
