use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::future::Future;
use url::Url;

use super::mock::MockBackend;
use super::request::Request;

/// Something that can answer backend requests with a JSON body.
///
/// Implemented by the HTTP client and the built-in demo data; tests plug in
/// recording fakes.
pub trait Backend: Clone + Send + Sync + 'static {
  fn request(&self, request: &Request) -> impl Future<Output = Result<Value>> + Send;
}

/// JSON-over-HTTP backend
#[derive(Clone)]
pub struct HttpBackend {
  http: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl HttpBackend {
  pub fn new(base_url: &str) -> Result<Self> {
    let mut base =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API url '{}': {}", base_url, e))?;

    // Url::join replaces the last segment unless the path ends with a slash
    if !base.path().ends_with('/') {
      base.set_path(&format!("{}/", base.path()));
    }

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      token: Config::get_api_token(),
    })
  }

  fn url(&self, request: &Request) -> Result<Url> {
    let mut url = self
      .base
      .join(request.endpoint().name())
      .map_err(|e| eyre!("Failed to build url for {}: {}", request.endpoint(), e))?;

    match request {
      Request::PaginatedTransactions { page: Some(page) } => {
        url.query_pairs_mut().append_pair("page", &page.to_string());
      }
      Request::TransactionsByEmployee { employee_id } => {
        url
          .query_pairs_mut()
          .append_pair("employeeId", employee_id);
      }
      _ => {}
    }

    Ok(url)
  }
}

impl Backend for HttpBackend {
  async fn request(&self, request: &Request) -> Result<Value> {
    let url = self.url(request)?;

    let builder = match request {
      Request::SetTransactionApproval { .. } => self.http.post(url).json(&request.params()),
      _ => self.http.get(url),
    };
    let builder = match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    };

    let response = builder
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", request.endpoint(), e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", request.endpoint(), e))?;

    let bytes = response
      .bytes()
      .await
      .map_err(|e| eyre!("Failed to read {} response: {}", request.endpoint(), e))?;

    if bytes.is_empty() {
      return Ok(Value::Null);
    }

    serde_json::from_slice(&bytes)
      .map_err(|e| eyre!("Failed to parse {} response: {}", request.endpoint(), e))
  }
}

/// Backend picked at startup from configuration.
#[derive(Clone)]
pub enum AnyBackend {
  Http(HttpBackend),
  Mock(MockBackend),
}

impl AnyBackend {
  pub fn from_config(config: &Config) -> Result<Self> {
    match &config.api.url {
      Some(url) => Ok(Self::Http(HttpBackend::new(url)?)),
      None => Ok(Self::Mock(MockBackend::demo(&config.demo))),
    }
  }

  pub fn describe(&self) -> String {
    match self {
      Self::Http(http) => http.base.to_string(),
      Self::Mock(_) => "demo data".to_string(),
    }
  }
}

impl Backend for AnyBackend {
  async fn request(&self, request: &Request) -> Result<Value> {
    match self {
      Self::Http(http) => http.request(request).await,
      Self::Mock(mock) => mock.request(request).await,
    }
  }
}
