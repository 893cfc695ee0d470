//! Blocking client for the hosted table/storage/auth service.
//!
//! The service speaks a PostgREST-style dialect: tables under `/rest/v1`,
//! objects under `/storage/v1`, password sign-in under `/auth/v1`. Every
//! request carries the public anon key as both `apikey` and bearer token.

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::config::BackendSection;
use crate::store::{Entity, Query};

pub struct HostedClient {
    base: Url,
    key: String,
    http: Client,
}

impl HostedClient {
    pub fn new(backend: &BackendSection) -> Result<Self, String> {
        let base = Url::parse(backend.url.trim_end_matches('/'))
            .map_err(|e| format!("Invalid backend URL {}: {}", backend.url, e))?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(backend.timeout_secs.max(1)))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;
        Ok(HostedClient {
            base,
            key: backend.anon_key.clone(),
            http,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, String> {
        self.base
            .join(path)
            .map_err(|e| format!("Invalid endpoint {}: {}", path, e))
    }

    pub fn table_url(&self, entity: Entity) -> Result<Url, String> {
        self.endpoint(&format!("/rest/v1/{}", entity.table()))
    }

    /// Public URL of a stored object; no request is made.
    pub fn public_object_url(&self, bucket: &str, name: &str) -> Result<String, String> {
        Ok(self
            .endpoint(&format!("/storage/v1/object/public/{}/{}", bucket, name))?
            .to_string())
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    pub fn patch(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.patch(url))
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.delete(url))
    }

    pub fn head(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.head(url))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
            .header("Accept", "application/json")
    }

    /// Send a request and turn non-2xx answers into the service's message.
    pub fn send(&self, req: RequestBuilder, what: &str) -> Result<Response, String> {
        let resp = req
            .send()
            .map_err(|e| format!("{} request failed: {}", what, e))?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        Err(format!("{} returned {}: {}", what, status, error_message(&text)))
    }

    /// Exchange email/password for a session; `Ok(false)` on bad credentials.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<bool, String> {
        let url = self.endpoint("/auth/v1/token?grant_type=password")?;
        let resp = self
            .post(url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .map_err(|e| format!("Sign-in request failed: {}", e))?;
        let status = resp.status();
        if status.is_success() {
            let body: Value = resp
                .json()
                .map_err(|e| format!("Sign-in JSON parse error: {}", e))?;
            return Ok(body.get("access_token").and_then(|t| t.as_str()).is_some());
        }
        if status.as_u16() == 400 || status.as_u16() == 401 {
            return Ok(false);
        }
        let text = resp.text().unwrap_or_default();
        Err(format!("Sign-in returned {}: {}", status, error_message(&text)))
    }
}

/// Append select/filter/order/limit parameters for a table read.
pub fn apply_query(url: &mut Url, query: &Query) {
    let mut pairs = url.query_pairs_mut();
    pairs.append_pair("select", "*");
    for (column, value) in &query.filters {
        pairs.append_pair(column, &format!("eq.{}", filter_literal(value)));
    }
    if let Some(order) = &query.order {
        pairs.append_pair(
            "order",
            &format!("{}.{}", order.column, order.direction.keyword()),
        );
    }
    if let Some(limit) = query.limit {
        pairs.append_pair("limit", &limit.to_string());
    }
}

/// Restrict a request to the row with `id`.
pub fn match_id(url: &mut Url, id: &str) {
    url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
}

fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(header: &str) -> Option<i64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

/// The service reports errors as JSON with `message` or `error`; fall back to raw text.
pub fn error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error_description", "error", "msg"] {
            if let Some(m) = v.get(key).and_then(|m| m.as_str()) {
                return m.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no details".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Order;

    fn client() -> HostedClient {
        let backend = BackendSection {
            url: "https://demo.example.co/".to_string(),
            anon_key: "anon".to_string(),
            ..BackendSection::default()
        };
        HostedClient::new(&backend).unwrap()
    }

    #[test]
    fn table_and_object_urls() {
        let c = client();
        assert_eq!(
            c.table_url(Entity::ContactMessages).unwrap().as_str(),
            "https://demo.example.co/rest/v1/contact_messages"
        );
        assert_eq!(
            c.public_object_url("faculty-photos", "abc-1.png").unwrap(),
            "https://demo.example.co/storage/v1/object/public/faculty-photos/abc-1.png"
        );
    }

    #[test]
    fn query_parameters() {
        let c = client();
        let mut url = c.table_url(Entity::Students).unwrap();
        let q = Query::new()
            .eq("is_topper", true)
            .order(Order::desc("cgpa"))
            .limit(3);
        apply_query(&mut url, &q);
        assert_eq!(
            url.query(),
            Some("select=*&is_topper=eq.true&order=cgpa.desc&limit=3")
        );
    }

    #[test]
    fn string_filters_are_not_quoted() {
        let c = client();
        let mut url = c.table_url(Entity::ContactMessages).unwrap();
        apply_query(&mut url, &Query::new().eq("status", "new"));
        assert_eq!(url.query(), Some("select=*&status=eq.new"));
    }

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-4/*"), None);
    }

    #[test]
    fn error_messages() {
        assert_eq!(error_message(r#"{"message":"duplicate key"}"#), "duplicate key");
        assert_eq!(error_message(r#"{"error":"Bucket not found"}"#), "Bucket not found");
        assert_eq!(error_message("  gateway timeout "), "gateway timeout");
        assert_eq!(error_message(""), "no details");
    }
}
