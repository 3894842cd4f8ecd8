use crate::reconcile::CAMERA_PROXY_PATH;
use crate::snapshot::{Snapshot, StateObject};
use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use reqwest::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use url::Url;

const STATES_PATH: &str = "/api/states";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct HassClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl HassClient {
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("invalid host URL '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("host URL must use http or https, got '{}'", parsed.scheme());
        }
        if token.trim().is_empty() {
            bail!("an access token is required (pass --token or set HASS_TOKEN)");
        }
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed building HTTP client")?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        Url::parse(&joined).with_context(|| format!("invalid host path '{path}'"))
    }

    pub async fn fetch_states(&self) -> Result<Snapshot> {
        let url = self.resolve(STATES_PATH)?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .context("failed to connect to host API")?;
        let status = response.status();
        if !status.is_success() {
            bail!("state request failed: {status}");
        }
        let states: Vec<StateObject> = response
            .json()
            .await
            .context("failed to parse state listing")?;
        Ok(Snapshot::from_states(states))
    }

    pub async fn fetch_camera_image(&self, entity_id: &str) -> Result<CameraImage> {
        let url = self.resolve(&format!("{CAMERA_PROXY_PATH}{entity_id}"))?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .with_context(|| format!("failed requesting image for {entity_id}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("image request for {entity_id} failed: {status}"));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_owned());
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed reading image body for {entity_id}"))?;
        Ok(CameraImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl CameraImage {
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            BASE64_ENGINE.encode(&self.bytes)
        )
    }

    pub fn file_extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraImage, HassClient};
    use std::time::Duration;

    fn client(base: &str) -> HassClient {
        HassClient::new(base, "secret".to_owned(), Duration::from_secs(1)).expect("client builds")
    }

    #[test]
    fn resolves_paths_against_base_with_prefix() {
        let client = client("http://ha.local:8123/");
        assert_eq!(
            client.resolve("/api/states").expect("url").as_str(),
            "http://ha.local:8123/api/states"
        );

        let prefixed = self::client("https://example.org/home");
        assert_eq!(
            prefixed
                .resolve("/api/camera_proxy_stream/camera.a?token=t&interval=1")
                .expect("url")
                .as_str(),
            "https://example.org/home/api/camera_proxy_stream/camera.a?token=t&interval=1"
        );
    }

    #[test]
    fn rejects_bad_scheme_and_missing_token() {
        assert!(HassClient::new("rtsp://cam", "t".to_owned(), Duration::from_secs(1)).is_err());
        assert!(HassClient::new("http://ha", " ".to_owned(), Duration::from_secs(1)).is_err());
        assert!(HassClient::new("not a url", "t".to_owned(), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn image_becomes_data_uri() {
        let image = CameraImage {
            content_type: "image/png".to_owned(),
            bytes: b"abc".to_vec(),
        };
        assert_eq!(image.data_uri(), "data:image/png;base64,YWJj");
        assert_eq!(image.file_extension(), "png");
    }
}
