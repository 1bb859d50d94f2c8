use bookwheel::domain::{BookMetadata, DomainError};
use bookwheel::services::MetadataResolver;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISBN: &str = "9780441013593";

fn resolver(server: &MockServer) -> MetadataResolver {
    MetadataResolver::with_base_urls(&server.uri(), &server.uri())
}

async fn mount_openlibrary(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("bibkeys", format!("ISBN:{}", ISBN)))
        .and(query_param("jscmd", "data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn primary_hit_never_calls_the_secondary() {
    let server = MockServer::start().await;
    mount_openlibrary(
        &server,
        json!({
            (format!("ISBN:{}", ISBN)): {
                "title": "Dune",
                "authors": [{"name": "Frank Herbert"}, {"name": "Someone Else"}],
                "cover": {"medium": "https://covers.example/m.jpg", "small": "https://covers.example/s.jpg"},
                "subjects": [
                    {"name": "Science Fiction"}, {"name": "Deserts"}, {"name": "Politics"},
                    {"name": "Ecology"}, {"name": "Religion"}, {"name": "Spice"}
                ]
            }
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalItems": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let found = resolver(&server).resolve("978-0-441-01359-3").await.unwrap();

    assert_eq!(
        found,
        Some(BookMetadata {
            title: Some("Dune".to_string()),
            author: Some("Frank Herbert".to_string()),
            cover_url: Some("https://covers.example/m.jpg".to_string()),
            genre: vec![
                "Science Fiction".to_string(),
                "Deserts".to_string(),
                "Politics".to_string(),
                "Ecology".to_string(),
                "Religion".to_string(),
            ],
        })
    );
}

#[tokio::test]
async fn primary_miss_falls_back_to_google_books() {
    let server = MockServer::start().await;
    mount_openlibrary(&server, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", format!("isbn:{}", ISBN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "imageLinks": {"thumbnail": "http://books.google.com/thumb.jpg"},
                    "categories": ["Fiction"]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let found = resolver(&server).resolve(ISBN).await.unwrap().unwrap();

    assert_eq!(found.title.as_deref(), Some("Dune"));
    assert_eq!(
        found.cover_url.as_deref(),
        Some("https://books.google.com/thumb.jpg")
    );
    assert_eq!(found.genre, vec!["Fiction"]);
}

#[tokio::test]
async fn both_providers_missing_is_not_an_error() {
    let server = MockServer::start().await;
    mount_openlibrary(&server, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalItems": 0})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(resolver(&server).resolve(ISBN).await.unwrap(), None);
}

#[tokio::test]
async fn provider_failure_is_distinct_from_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = resolver(&server).resolve(ISBN).await.unwrap_err();
    assert!(matches!(err, DomainError::External(_)));
}

#[tokio::test]
async fn malformed_payload_is_an_error() {
    let server = MockServer::start().await;
    mount_openlibrary(&server, json!({})).await;
    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = resolver(&server).resolve(ISBN).await.unwrap_err();
    assert!(matches!(err, DomainError::External(_)));
}

#[tokio::test]
async fn blank_isbn_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = resolver(&server).resolve(" - ").await.unwrap_err();
    assert_eq!(err, DomainError::Validation("Please enter an ISBN".to_string()));
}
