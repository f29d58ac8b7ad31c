//! Document store speaking the Firebase Realtime Database REST protocol.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};
use url::Url;

use hymnal_core::storage::{
    remote_error_from_status, DocumentStore, RemoteError, RemotePath, RemoteResult,
    TransactionFn,
};

/// Default number of retries when a transaction loses a compare-and-set.
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Builds `{base}/{path}.json` with an optional `auth` query parameter.
pub fn resource_url(base: &Url, path: &RemotePath, auth: Option<&str>) -> RemoteResult<Url> {
    let mut segments: Vec<String> = path.segments().map(str::to_string).collect();
    match segments.last_mut() {
        Some(last) => last.push_str(".json"),
        None => segments.push(".json".to_string()),
    }

    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| RemoteError::Rejected(format!("invalid base URL: {base}")))?
        .pop_if_empty()
        .extend(segments.iter().map(String::as_str));

    if let Some(auth) = auth {
        url.query_pairs_mut().append_pair("auth", auth);
    }
    Ok(url)
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Serialization(err.to_string())
    } else {
        RemoteError::Unavailable(err.to_string())
    }
}

fn check_status(response: Response, path: &RemotePath) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(remote_error_from_status(status.as_u16(), &path.to_string()))
    }
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

/// A [`DocumentStore`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    client: Client,
    base: Url,
    auth: Option<String>,
    max_retries: usize,
}

impl RestDocumentStore {
    pub fn new(base: Url, auth: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base,
            auth,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Parses `base` and builds a store.
    pub fn from_url(base: &str, auth: Option<String>) -> RemoteResult<Self> {
        let base = Url::parse(base).map_err(|e| RemoteError::Rejected(e.to_string()))?;
        Ok(Self::new(base, auth))
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn url(&self, path: &RemotePath) -> RemoteResult<Url> {
        resource_url(&self.base, path, self.auth.as_deref())
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get(&self, path: &RemotePath) -> RemoteResult<Option<Value>> {
        let response = self
            .client
            .get(self.url(path)?)
            .send()
            .await
            .map_err(transport_error)?;
        let value: Value = check_status(response, path)?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(non_null(value))
    }

    async fn query_equal(
        &self,
        path: &RemotePath,
        child: &str,
        value: &Value,
    ) -> RemoteResult<Value> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("orderBy", &format!("\"{child}\""))
            .append_pair("equalTo", &value.to_string());

        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let result: Value = check_status(response, path)?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(non_null(result).unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn set(&self, path: &RemotePath, value: Value) -> RemoteResult<()> {
        let response = self
            .client
            .put(self.url(path)?)
            .json(&value)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, path)?;
        tracing::debug!(path = %path, "Document set");
        Ok(())
    }

    async fn update(&self, path: &RemotePath, fields: Map<String, Value>) -> RemoteResult<()> {
        let response = self
            .client
            .patch(self.url(path)?)
            .json(&fields)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, path)?;
        tracing::debug!(path = %path, "Document updated");
        Ok(())
    }

    async fn remove(&self, path: &RemotePath) -> RemoteResult<()> {
        let response = self
            .client
            .delete(self.url(path)?)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, path)?;
        tracing::debug!(path = %path, "Document removed");
        Ok(())
    }

    /// Compare-and-set using the ETag of the current value. A write that
    /// loses the race (`412`) is retried with the new value, up to
    /// `max_retries` times.
    async fn transaction(
        &self,
        path: &RemotePath,
        f: TransactionFn,
    ) -> RemoteResult<Option<Value>> {
        let url = self.url(path)?;

        for attempt in 0..=self.max_retries {
            let response = self
                .client
                .get(url.clone())
                .header("X-Firebase-ETag", "true")
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, path)?;
            let etag = response
                .headers()
                .get("etag")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| RemoteError::Serialization("response has no ETag".to_string()))?;
            let current = non_null(response.json().await.map_err(transport_error)?);

            let next = f(current.as_ref());
            if next == current {
                return Ok(current);
            }

            let request = match &next {
                Some(value) => self.client.put(url.clone()).json(value),
                None => self.client.delete(url.clone()),
            };
            let response = request
                .header("if-match", etag)
                .send()
                .await
                .map_err(transport_error)?;

            if response.status() == StatusCode::PRECONDITION_FAILED {
                tracing::debug!(path = %path, attempt, "Transaction conflict, retrying");
                continue;
            }
            check_status(response, path)?;
            tracing::debug!(path = %path, removed = next.is_none(), "Transaction committed");
            return Ok(next);
        }

        tracing::warn!(path = %path, retries = self.max_retries, "Transaction gave up");
        Err(RemoteError::Conflict(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base() -> Url {
        Url::parse("https://lpmi-demo.firebaseio.com").unwrap()
    }

    #[test]
    fn test_resource_url() {
        let url = resource_url(&base(), &RemotePath::new("song_collection/LPMI/songs"), None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://lpmi-demo.firebaseio.com/song_collection/LPMI/songs.json"
        );
    }

    #[test]
    fn test_resource_url_root_and_auth() {
        let url = resource_url(&base(), &RemotePath::default(), Some("secret")).unwrap();
        assert_eq!(url.as_str(), "https://lpmi-demo.firebaseio.com/.json?auth=secret");
    }

    #[test]
    fn test_resource_url_keeps_base_path() {
        let base = Url::parse("http://localhost:9000/ns/").unwrap();
        let url = resource_url(&base, &RemotePath::new("users/u1"), None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/ns/users/u1.json");
    }

    #[test]
    fn test_resource_url_escapes_segments() {
        let url = resource_url(&base(), &RemotePath::new("users/a b"), None).unwrap();
        assert_eq!(url.as_str(), "https://lpmi-demo.firebaseio.com/users/a%20b.json");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(resource_url(&base, &RemotePath::new("x"), None).is_err());
    }

    #[test]
    fn test_from_url_rejects_garbage() {
        assert!(RestDocumentStore::from_url("not a url", None).is_err());
    }

    fn store(server: &MockServer) -> RestDocumentStore {
        RestDocumentStore::from_url(&server.uri(), None).unwrap()
    }

    fn versioned(value: Value, etag: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(value)
            .insert_header("etag", etag)
    }

    fn increment() -> TransactionFn {
        Box::new(|current: Option<&Value>| {
            let n = current.and_then(Value::as_i64).unwrap_or(0);
            Some(json!(n + 1))
        })
    }

    #[tokio::test]
    async fn test_get_maps_null_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/u1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/u2/role.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("admin")))
            .mount(&server)
            .await;

        let store = store(&server);

        assert_eq!(store.get(&RemotePath::new("users/u1")).await.unwrap(), None);
        assert_eq!(
            store.get(&RemotePath::new("users/u2/role")).await.unwrap(),
            Some(json!("admin"))
        );
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bible/books.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = store(&server)
            .get(&RemotePath::new("bible/books"))
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_query_equal_quotes_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bible/chapters.json"))
            .and(query_param("orderBy", "\"book_id\""))
            .and(query_param("equalTo", "\"GEN\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "GEN_1": { "book_id": "GEN", "chapter": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bible/verses.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let store = store(&server);
        let chapters = store
            .query_equal(&RemotePath::new("bible/chapters"), "book_id", &json!("GEN"))
            .await
            .unwrap();
        let verses = store
            .query_equal(&RemotePath::new("bible/verses"), "book_id", &json!("GEN"))
            .await
            .unwrap();

        assert_eq!(chapters, json!({ "GEN_1": { "book_id": "GEN", "chapter": 1 } }));
        assert_eq!(verses, json!({}));
    }

    #[tokio::test]
    async fn test_set_puts_value() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/users/u1/role.json"))
            .and(body_json(json!("admin")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!("admin")))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .set(&RemotePath::new("users/u1/role"), json!("admin"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transaction_commits_with_etag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/counter.json"))
            .and(header("X-Firebase-ETag", "true"))
            .respond_with(versioned(json!(1), "e1"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/counter.json"))
            .and(header("if-match", "e1"))
            .and(body_json(json!(2)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
            .expect(1)
            .mount(&server)
            .await;

        let committed = store(&server)
            .transaction(&RemotePath::new("counter"), increment())
            .await
            .unwrap();

        assert_eq!(committed, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_transaction_retries_after_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/counter.json"))
            .respond_with(versioned(json!(1), "e1"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/counter.json"))
            .respond_with(versioned(json!(5), "e2"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/counter.json"))
            .and(header("if-match", "e1"))
            .respond_with(ResponseTemplate::new(412))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/counter.json"))
            .and(header("if-match", "e2"))
            .and(body_json(json!(6)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(6)))
            .expect(1)
            .mount(&server)
            .await;

        let committed = store(&server)
            .transaction(&RemotePath::new("counter"), increment())
            .await
            .unwrap();

        assert_eq!(committed, Some(json!(6)));
    }

    #[tokio::test]
    async fn test_transaction_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/counter.json"))
            .respond_with(versioned(json!(1), "e1"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/counter.json"))
            .respond_with(ResponseTemplate::new(412))
            .expect(3)
            .mount(&server)
            .await;

        let err = store(&server)
            .with_max_retries(2)
            .transaction(&RemotePath::new("counter"), increment())
            .await
            .unwrap_err();

        assert_eq!(err, RemoteError::Conflict("counter".to_string()));
    }

    #[tokio::test]
    async fn test_transaction_removal_deletes_node() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user_favorites/u1/LPMI/001.json"))
            .respond_with(versioned(json!(true), "e7"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/user_favorites/u1/LPMI/001.json"))
            .and(header("if-match", "e7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;

        let committed = store(&server)
            .transaction(
                &RemotePath::new("user_favorites/u1/LPMI/001"),
                Box::new(|_: Option<&Value>| None),
            )
            .await
            .unwrap();

        assert_eq!(committed, None);
    }

    #[tokio::test]
    async fn test_transaction_noop_skips_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/counter.json"))
            .respond_with(versioned(json!(3), "e1"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let committed = store(&server)
            .transaction(
                &RemotePath::new("counter"),
                Box::new(|current: Option<&Value>| current.cloned()),
            )
            .await
            .unwrap();

        assert_eq!(committed, Some(json!(3)));
    }
}
