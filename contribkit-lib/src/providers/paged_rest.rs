use crate::Result;
use ohno::{IntoAppError, app_err};
use reqwest::Response;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "      rest";

/// Entries requested per page; a shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// A minimal JSON-over-HTTPS client for the REST APIs the satellite providers read from.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    /// Create a client that sends `token` in the `auth_header` header on every request.
    ///
    /// `scheme` is prepended to the token, e.g. `"bearer "` for GitHub or `""` for GitLab.
    pub fn new(base_url: &str, auth_header: HeaderName, scheme: &str, token: &str) -> Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("{scheme}{token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(auth_header, auth_val);

        let client = reqwest::Client::builder()
            .user_agent("contribkit")
            .default_headers(headers)
            .build()?;

        // A trailing slash makes `join` append instead of replacing the last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .into_app_err_with(|| format!("invalid API base URL '{base_url}'"))?;

        Ok(Self { client, base_url })
    }

    /// Build the URL for `path` (relative to the base) with the given query parameters.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .into_app_err_with(|| format!("invalid API path '{path}'"))?;

        if !query.is_empty() {
            let _ = url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!(target: LOG_TARGET, "GET {url}");

        let resp = self.client.get(url.clone()).send().await?;
        decode(resp, &url).await
    }

    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(&self, url: Url, body: &B) -> Result<T> {
        log::debug!(target: LOG_TARGET, "POST {url}");

        let resp = self.client.post(url.clone()).json(body).send().await?;
        decode(resp, &url).await
    }

    /// Read every page of `path`, starting at page 1, until a page comes back short or empty.
    pub async fn get_all_pages<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let per_page = PAGE_SIZE.to_string();
        let mut all = Vec::new();

        for page in 1_usize.. {
            let page_str = page.to_string();
            let mut params = vec![("page", page_str.as_str()), ("per_page", per_page.as_str())];
            params.extend_from_slice(query);

            let items: Vec<T> = self.get_json(self.url(path, &params)?).await?;
            let count = items.len();
            all.extend(items);

            if count < PAGE_SIZE {
                break;
            }
        }

        Ok(all)
    }
}

/// Fetch a JSON document from a pre-signed URL, without the API credentials.
pub async fn download_json<T: DeserializeOwned>(url: &str) -> Result<T> {
    let url = Url::parse(url).into_app_err_with(|| format!("invalid download URL '{url}'"))?;
    log::debug!(target: LOG_TARGET, "GET {url}");

    let client = reqwest::Client::builder().user_agent("contribkit").build()?;
    let resp = client.get(url.clone()).send().await?;
    decode(resp, &url).await
}

async fn decode<T: DeserializeOwned>(resp: Response, url: &Url) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        return Err(app_err!("request to '{url}' failed with HTTP status {status}"));
    }

    resp.json::<T>().await.into_app_err_with(|| format!("decoding response from '{url}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn client(base: &str) -> RestClient {
        RestClient::new(base, AUTHORIZATION, "bearer ", "secret").unwrap()
    }

    #[test]
    fn test_url_joins_path_under_base() {
        let url = client("https://gitlab.example/api/v4").url("projects/7/repository/contributors", &[]).unwrap();
        assert_eq!(url.as_str(), "https://gitlab.example/api/v4/projects/7/repository/contributors");
    }

    #[test]
    fn test_url_tolerates_slashes() {
        let url = client("https://api.example/").url("/repos/a/b/contributors", &[("page", "2")]).unwrap();
        assert_eq!(url.as_str(), "https://api.example/repos/a/b/contributors?page=2");
    }

    #[test]
    fn test_url_encodes_query_values() {
        let url = client("https://gitlab.example/api/v4")
            .url("users", &[("search", "dev+ops@example.com")])
            .unwrap();
        assert_eq!(url.as_str(), "https://gitlab.example/api/v4/users?search=dev%2Bops%40example.com");
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let _ = RestClient::new("not a url", AUTHORIZATION, "", "secret").unwrap_err();
    }
}
