use reqwest::{Client, Request};
use tracing::{debug, warn};

use crate::models::{Book, CatalogResponse};

use super::error::FetchError;

/// Thin wrapper around a shared `reqwest` client pointed at the catalog's
/// search endpoint. Cloning is cheap; each spawned search task gets its own
/// handle.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    search_url: String,
}

impl CatalogClient {
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            search_url: search_url.into(),
        }
    }

    /// Build the GET request for a title search. The query is URL-encoded
    /// into the `title` parameter.
    pub fn search_request(&self, query: &str) -> Result<Request, FetchError> {
        let request = self
            .http
            .get(&self.search_url)
            .query(&[("title", query)])
            .build()?;
        Ok(request)
    }

    /// Run one title search and return every document from the response, in
    /// catalog order. Capping the list is the caller's job.
    ///
    /// The status code is not treated as fatal on its own: a body that still
    /// decodes is accepted, and anything else fails in decoding.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, FetchError> {
        let request = self.search_request(query)?;
        debug!(url = %request.url(), "sending catalog search");

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "catalog responded with a non-success status");
        }

        let body = response.bytes().await?;
        decode_search_response(&body)
    }
}

/// Parse a catalog search body into its list of documents. A body with no
/// `docs` field yields an empty list.
pub fn decode_search_response(body: &[u8]) -> Result<Vec<Book>, FetchError> {
    let response: CatalogResponse = serde_json::from_slice(body)?;
    Ok(response.docs)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer exactly one HTTP request on a local port with the given status
    /// line and body, returning the search URL to point a client at.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/search.json")
    }

    fn local_client(search_url: String) -> CatalogClient {
        CatalogClient {
            http: Client::builder().no_proxy().build().unwrap(),
            search_url,
        }
    }

    const HOBBIT_BODY: &str = r#"{
        "numFound": 2,
        "start": 0,
        "docs": [
            {
                "key": "/works/OL27482W",
                "title": "The Hobbit",
                "author_name": ["J.R.R. Tolkien"],
                "first_publish_year": 1937,
                "cover_i": 14627509,
                "edition_count": 500
            },
            {
                "key": "/works/OL9999W",
                "title": "The Hobbit Companion"
            }
        ]
    }"#;

    #[test]
    fn decodes_documents_in_order_and_ignores_extra_fields() {
        let books = decode_search_response(HOBBIT_BODY.as_bytes()).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title.as_deref(), Some("The Hobbit"));
        assert_eq!(books[0].first_publish_year, Some(1937));
        assert_eq!(books[0].cover_i, Some(14627509));
        assert_eq!(
            books[0].author_name.as_deref(),
            Some(&["J.R.R. Tolkien".to_string()][..])
        );
        assert_eq!(books[1].key.as_deref(), Some("/works/OL9999W"));
        assert!(books[1].author_name.is_none());
    }

    #[test]
    fn empty_docs_decode_to_empty_list() {
        let books = decode_search_response(br#"{"numFound":0,"docs":[]}"#).unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn html_error_page_is_a_decode_error() {
        let err = decode_search_response(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn search_request_encodes_title_parameter() {
        let client = CatalogClient::new("https://openlibrary.org/search.json");
        let request = client.search_request("the lord & the rings").unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().host_str(), Some("openlibrary.org"));
        assert_eq!(request.url().path(), "/search.json");

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![("title".to_string(), "the lord & the rings".to_string())]
        );
        assert!(!request.url().query().unwrap_or_default().contains(' '));
    }

    #[test]
    fn malformed_endpoint_is_a_transport_error() {
        let client = CatalogClient::new("not a url");
        let err = client.search_request("dune").unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn error_status_with_decodable_body_still_returns_documents() {
        let url = serve_once("503 Service Unavailable", HOBBIT_BODY).await;
        let books = local_client(url).search("the hobbit").await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title.as_deref(), Some("The Hobbit"));
    }

    #[tokio::test]
    async fn error_status_with_html_body_is_a_decode_error() {
        let url = serve_once("500 Internal Server Error", "<html>oops</html>").await;
        let err = local_client(url).search("dune").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn successful_search_decodes_the_body() {
        let url = serve_once("200 OK", r#"{"numFound":0,"docs":[]}"#).await;
        let books = local_client(url).search("zzzz").await.unwrap();
        assert!(books.is_empty());
    }
}
