// API client module: a small blocking HTTP client that talks to the hub.
// Every hub endpoint answers with the same JSON envelope, so the client
// exposes one generic `request` plus fixed-verb wrappers and leaves the
// payload shape to the caller.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use crate::config::ConfigStore;
use crate::error::{Error, Result};

/// Query parameters. Ordered so the encoded URL is deterministic.
pub type Query = BTreeMap<String, String>;

/// Schema-less JSON object used for ad-hoc request bodies.
pub type Body = serde_json::Map<String, Value>;

static NULL: Value = Value::Null;

/// Uniform wrapper around every hub response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Error descriptor carried by a failed envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Page metadata for list endpoints. Null fields read as zero/false.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    #[serde(deserialize_with = "null_as_default")]
    pub page: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub has_more: bool,
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

impl Envelope {
    /// Raw payload, `null` when the hub sent none.
    pub fn data(&self) -> &Value {
        self.data.as_ref().unwrap_or(&NULL)
    }

    /// Decode the payload into the shape the caller expects.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(self.data()).map_err(Error::Decode)
    }

    /// Whether the hub says more pages follow this one.
    pub fn has_more(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_more)
    }
}

/// Blocking hub client holding the base URL and an optional bearer
/// credential. One instance serves a handful of sequential calls.
#[derive(Clone)]
pub struct HubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HubClient {
    /// Build a client from the persisted config at the default location.
    pub fn from_config() -> Result<Self> {
        let store = ConfigStore::default_location()?;
        Self::from_store(&store)
    }

    /// Build a client from the config held by `store`.
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let cfg = store.load()?;
        Self::with_token(cfg.hub_url.clone(), cfg.auth_token().unwrap_or_default())
    }

    /// Build a client for an explicit hub and credential. An empty token
    /// means requests go out unauthenticated.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder().build().map_err(Error::Network)?;
        let token = Some(token.into()).filter(|t| !t.is_empty());
        Ok(HubClient {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns whether a credential will be attached to requests.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Join the base URL and `path`, then append `query` percent-encoded.
    pub fn url_for(&self, path: &str, query: Option<&Query>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send one request and decode the envelope. A `success: false`
    /// envelope becomes `Error::Api`, which still carries the envelope.
    pub fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&Query>,
    ) -> Result<Envelope>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(|b| serde_json::to_vec(b).map_err(Error::Encode))
            .transpose()?;
        self.execute(method, path, payload, query)
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        query: Option<&Query>,
    ) -> Result<Envelope> {
        let url = self.url_for(path, query)?;
        tracing::debug!(%method, %url, "hub request");

        let mut req = self.http.request(method, url);
        if let Some(bytes) = payload {
            req = req.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let res = req.send().map_err(Error::Network)?;
        let status = res.status();
        let raw = res.bytes().map_err(Error::Io)?;
        tracing::debug!(status = status.as_u16(), len = raw.len(), "hub response");

        let envelope: Envelope = serde_json::from_slice(&raw).map_err(Error::Decode)?;
        if envelope.success {
            return Ok(envelope);
        }

        let (code, message) = match &envelope.error {
            Some(e) => (e.code.clone(), e.message.clone()),
            None => (
                format!("HTTP_{}", status.as_u16()),
                format!("request failed with status {}", status.as_u16()),
            ),
        };
        Err(Error::Api {
            status: status.as_u16(),
            code,
            message,
            envelope: Box::new(envelope),
        })
    }

    pub fn get(&self, path: &str, query: &Query) -> Result<Envelope> {
        self.execute(Method::GET, path, None, Some(query))
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        self.request(Method::POST, path, Some(body), None)
    }

    /// POST with no payload at all.
    pub fn post_empty(&self, path: &str) -> Result<Envelope> {
        self.execute(Method::POST, path, None, None)
    }

    pub fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Envelope> {
        self.request(Method::PATCH, path, Some(body), None)
    }

    /// PATCH with no payload at all.
    pub fn patch_empty(&self, path: &str) -> Result<Envelope> {
        self.execute(Method::PATCH, path, None, None)
    }

    pub fn delete(&self, path: &str) -> Result<Envelope> {
        self.execute(Method::DELETE, path, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_success_envelope_with_pagination() {
        let env: Envelope = serde_json::from_value(json!({
            "success": true,
            "data": [{"id": "n1"}],
            "pagination": {"page": 2, "limit": 20, "total": 45, "hasMore": true}
        }))
        .unwrap();

        assert!(env.success);
        assert!(env.has_more());
        let p = env.pagination.unwrap();
        assert_eq!((p.page, p.limit, p.total), (2, 20, 45));
    }

    #[test]
    fn pagination_tolerates_null_and_negative_counts() {
        let env: Envelope = serde_json::from_value(json!({
            "success": true,
            "data": [],
            "pagination": {"page": 1, "limit": 20, "total": null, "hasMore": null}
        }))
        .unwrap();
        let p = env.pagination.as_ref().unwrap();
        assert_eq!((p.page, p.limit, p.total), (1, 20, 0));
        assert!(!env.has_more());

        let env: Envelope = serde_json::from_str(
            r#"{"success":true,"pagination":{"page":1,"limit":20,"total":-1}}"#,
        )
        .unwrap();
        assert_eq!(env.pagination.map(|p| p.total), Some(-1));
    }

    #[test]
    fn missing_data_reads_as_null() {
        let env: Envelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(env.data(), &Value::Null);
        assert!(!env.has_more());
        let unit: Option<String> = env.data_as().unwrap();
        assert_eq!(unit, None);
    }

    #[test]
    fn data_as_reports_shape_mismatch() {
        let env: Envelope =
            serde_json::from_str(r#"{"success":true,"data":{"id":"123"}}"#).unwrap();
        let err = env.data_as::<Vec<String>>().unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn envelope_requires_success_flag() {
        assert!(serde_json::from_str::<Envelope>(r#"{"data":{}}"#).is_err());
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = HubClient::with_token("http://hub.local:3000/", "").unwrap();
        let url = client.url_for("/api/v1/agents", None).unwrap();
        assert_eq!(url.as_str(), "http://hub.local:3000/api/v1/agents");
    }

    #[test]
    fn url_encodes_query_in_key_order() {
        let client = HubClient::with_token("http://hub.local", "").unwrap();
        let query = Query::from([
            ("q".to_string(), "a&b c".to_string()),
            ("limit".to_string(), "10".to_string()),
        ]);
        let url = client.url_for("/api/v1/search", Some(&query)).unwrap();
        assert_eq!(url.query(), Some("limit=10&q=a%26b+c"));

        let pairs: Query = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, query);
    }

    #[test]
    fn empty_query_adds_nothing() {
        let client = HubClient::with_token("http://hub.local", "").unwrap();
        let url = client.url_for("/health", Some(&Query::new())).unwrap();
        assert_eq!(url.as_str(), "http://hub.local/health");
    }

    #[test]
    fn empty_token_means_no_credential() {
        assert!(!HubClient::with_token("http://hub.local", "").unwrap().has_token());
        assert!(HubClient::with_token("http://hub.local", "t").unwrap().has_token());
    }
}
