use crate::error::{BlackDuckError, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, Url};

/// Thin blocking HTTP client rooted at an Artifactory base URL
/// (e.g. `http://localhost:8081/artifactory`).
#[derive(Clone, Debug)]
pub struct ArtifactoryClient {
    base_url: Url,
    client: Client,
    credentials: Option<(String, Option<String>)>,
}

impl ArtifactoryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url: String = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(BlackDuckError::Api(
                "Artifactory URL cannot be empty".to_string(),
            ));
        }
        let base_url = Url::parse(base_url).map_err(|err| {
            BlackDuckError::Api(format!("invalid Artifactory URL '{}': {}", base_url, err))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BlackDuckError::Api(format!(
                "Artifactory URL '{}' cannot hold API paths",
                base_url
            )));
        }
        let client = Client::builder().build()?;
        Ok(Self {
            base_url,
            client,
            credentials: None,
        })
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL for `segments` appended to the base URL.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?`, `#` and `%`
    /// inside a segment never change which resource is addressed.
    pub fn url<I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BlackDuckError::Api(format!("Artifactory URL '{}' cannot hold API paths", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request<I>(&self, method: Method, segments: I) -> Result<RequestBuilder>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let builder = self.client.request(method, self.url(segments)?);
        Ok(match &self.credentials {
            Some((username, password)) => builder.basic_auth(username, password.as_ref()),
            None => builder,
        })
    }
}

pub(crate) trait ResponseExt: Sized {
    /// Turns any non-2xx response into a [`BlackDuckError::Status`].
    fn check_status(self) -> Result<Self>;
}

impl ResponseExt for Response {
    fn check_status(self) -> Result<Self> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }
        Err(BlackDuckError::Status {
            status: status.as_u16(),
            message: self.text().unwrap_or_default(),
        })
    }
}
