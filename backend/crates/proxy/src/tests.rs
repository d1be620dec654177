//! Router-level tests against a mocked upstream

#[cfg(test)]
mod router_tests {
    use crate::{HttpUpstream, ProxyConfig, proxy_router};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::upstream::UpstreamClient;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{
        body_json, body_string, header as header_is, method, path, query_param,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(base_url: &str, config: ProxyConfig) -> Router {
        let client = UpstreamClient::new(base_url, None).unwrap();
        Router::new().nest("/api", proxy_router(HttpUpstream::new(client), config))
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// A body with no declared length, delivered in small chunks
    fn unsized_body(text: &'static str) -> Body {
        let chunks = text
            .as_bytes()
            .chunks(4)
            .map(|c| Ok::<_, std::io::Error>(bytes::Bytes::from_static(c)))
            .collect::<Vec<_>>();
        Body::from_stream(tokio_stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_success_passes_through_with_status() {
        let server = MockServer::start().await;
        let upstream_body = json!({ "status": true, "message": "created", "data": { "id": "C9" } });
        Mock::given(method("POST"))
            .and(path("/community"))
            .and(header_is("authorization", "Bearer browser-token"))
            .and(body_json(json!({ "name": "Clean Air" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(upstream_body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/community")
                    .header(header::AUTHORIZATION, "Bearer browser-token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Clean Air"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await, upstream_body);
    }

    #[tokio::test]
    async fn test_query_and_id_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/community-post"))
            .and(query_param("community_id", "C1"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true, "data": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/community-post/P7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let router = app(&server.uri(), ProxyConfig::default());

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/community-post?community_id=C1&page=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/community-post/P7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_failure_is_normalized_with_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/community/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "No such community" })),
            )
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/api/community/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            read_json(response).await,
            json!({
                "error": "Community not found.",
                "backendStatus": 404,
                "backendError": { "detail": "No such community" }
            })
        );
    }

    #[tokio::test]
    async fn test_validation_failure_is_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community-category"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{ "loc": ["body", "name"], "msg": "field required", "type": "missing" }]
            })))
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/community-category")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("body.name: field required"));
        assert_eq!(body["backendStatus"], 422);
    }

    #[tokio::test]
    async fn test_unauthorized_uses_sign_in_wording() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/community-join-request"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/api/community-join-request")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["error"], "Authentication failed. Please sign in again.");
        assert_eq!(body["backendError"], json!({ "message": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let uri = {
            let server = MockServer::builder().start().await;
            server.uri()
        };

        let response = app(&uri, ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .uri("/api/community")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = read_json(response).await;
        assert_eq!(body["error"], "Failed to fetch communities");
        assert_eq!(body["backendStatus"], Value::Null);
    }

    #[tokio::test]
    async fn test_unsized_json_over_limit_is_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let config = ProxyConfig {
            max_json_bytes: 8,
            ..ProxyConfig::default()
        };
        let chunks = unsized_body(r#"{"name":"a community name well past eight"}"#);
        let response = app(&server.uri(), config)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/community")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(chunks)
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(read_json(response).await["error"], "Request body exceeds 8 bytes");
    }

    #[tokio::test]
    async fn test_form_login_keeps_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header_is("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("username=ada&password=pw"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t" })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=ada&password=pw"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_does_not_touch_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "status": "ok" }));
    }
}

#[cfg(test)]
mod upload_tests {
    use crate::{HttpUpstream, ProxyConfig, proxy_router};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::upstream::UpstreamClient;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_is, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "dataset-boundary";

    fn app(base_url: &str, config: ProxyConfig) -> Router {
        let client = UpstreamClient::new(base_url, None).unwrap();
        Router::new().nest("/api", proxy_router(HttpUpstream::new(client), config))
    }

    fn multipart_body(file: &str) -> String {
        format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Air quality\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"air.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {file}\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        )
    }

    fn upload_request(body: String, content_length: Option<u64>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/datasets/upload")
            .header(header::AUTHORIZATION, "Bearer t1")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(len) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, len);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_six_gib_upload_rejected_before_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/datasets/upload"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let six_gib: u64 = 6 * 1024 * 1024 * 1024;
        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(upload_request(multipart_body("a,b"), Some(six_gib)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = read_json(response).await;
        assert_eq!(body["error"], "File is too large. Maximum upload size is 5 GB.");
        assert_eq!(body["backendStatus"], Value::Null);
    }

    #[tokio::test]
    async fn test_streamed_bytes_over_ceiling_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/datasets/upload"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let config = ProxyConfig {
            max_upload_bytes: 16,
            ..ProxyConfig::default()
        };
        let response = app(&server.uri(), config)
            .oneshot(upload_request(multipart_body(&"x".repeat(64)), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_is_reencoded_and_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/datasets/upload"))
            .and(header_is("authorization", "Bearer t1"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "status": true, "data": { "id": "D1" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = multipart_body("station,pm25\nA,12");
        let len = body.len() as u64;
        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(upload_request(body, Some(len)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["data"]["id"], "D1");

        let received = server.received_requests().await.unwrap();
        let forwarded = String::from_utf8_lossy(&received[0].body);
        assert!(forwarded.contains("name=\"title\""));
        assert!(forwarded.contains("filename=\"air.csv\""));
        assert!(forwarded.contains("text/csv"));
        assert!(forwarded.contains("station,pm25"));
    }

    #[tokio::test]
    async fn test_field_after_file_is_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/datasets/upload"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"air.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             a,b\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             late\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        );
        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(upload_request(body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_json(response).await["error"],
            "Invalid request: The file must be the last field"
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nx\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let response = app(&server.uri(), ProxyConfig::default())
            .oneshot(upload_request(body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
