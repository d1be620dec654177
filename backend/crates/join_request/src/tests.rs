//! Orchestration scenarios against a mocked upstream

#[cfg(test)]
mod approve_tests {
    use crate::{
        ApproveJoinRequestUseCase, InMemoryOutbox, MembershipOutcome, OutboxStatus,
        join_request_router,
    };
    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use kernel::id::JoinRequestId;
    use platform::upstream::UpstreamClient;
    use proxy::HttpUpstream;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream(server: &MockServer) -> Arc<HttpUpstream> {
        Arc::new(HttpUpstream::new(
            UpstreamClient::new(&server.uri(), None).unwrap(),
        ))
    }

    fn app(server: &MockServer, outbox: &InMemoryOutbox) -> Router {
        Router::new().nest(
            "/api",
            join_request_router(upstream(server), Arc::new(outbox.clone())),
        )
    }

    fn approve_request(id: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/community-join-request/{id}/approve"))
            .header(header::AUTHORIZATION, "Bearer moderator")
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn mount_approve_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/community-join-request/R1/approve"))
            .and(header_is("authorization", "Bearer moderator"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true })))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_detail_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/community-join-request/R1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "user_id": "U1", "community_id": "C1" })),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_add_user_failure_still_returns_approval() {
        let server = MockServer::start().await;
        mount_approve_ok(&server).await;
        mount_detail_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .and(body_json(json!({ "user_id": "U1" })))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        let response = app(&server, &outbox)
            .oneshot(approve_request("R1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "status": true }));

        let entries = outbox.entries().await;
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.join_request_id.as_str(), "R1");
        assert_eq!(entry.status, OutboxStatus::Pending);
        let target = entry.target.as_ref().unwrap();
        assert_eq!(target.user_id.as_str(), "U1");
        assert_eq!(target.community_id.as_str(), "C1");
        // The moderator's token never lands in the outbox
        assert!(!format!("{entry:?}").contains("moderator"));
        assert!(entry.last_error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_failed_approve_skips_membership_steps() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community-join-request/R1/approve"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "detail": "Not a moderator" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        let response = app(&server, &outbox)
            .oneshot(approve_request("R1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            read_json(response).await,
            json!({
                "error": "Only community moderators can approve join requests.",
                "backendStatus": 403,
                "backendError": { "detail": "Not a moderator" }
            })
        );
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_happy_path_adds_member_inline() {
        let server = MockServer::start().await;
        mount_approve_ok(&server).await;
        mount_detail_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .and(header_is("authorization", "Bearer moderator"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "status": true })))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = Arc::new(InMemoryOutbox::new());
        let use_case = ApproveJoinRequestUseCase::new(upstream(&server), outbox.clone());

        let output = tokio_test::assert_ok!(
            use_case
                .execute(
                    &JoinRequestId::new("R1").unwrap(),
                    Some(HeaderValue::from_static("Bearer moderator")),
                )
                .await
        );

        assert_eq!(output.response.status, StatusCode::OK);
        assert_eq!(output.membership, MembershipOutcome::Added);
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_detail_queues_request_id_only() {
        let server = MockServer::start().await;
        mount_approve_ok(&server).await;
        Mock::given(method("GET"))
            .and(path("/community-join-request/R1"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        let response = app(&server, &outbox)
            .oneshot(approve_request("R1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let entries = outbox.entries().await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].target.is_none());
    }

    #[tokio::test]
    async fn test_already_member_counts_as_added() {
        let server = MockServer::start().await;
        mount_approve_ok(&server).await;
        mount_detail_ok(&server).await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(ResponseTemplate::new(409))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = Arc::new(InMemoryOutbox::new());
        let output = ApproveJoinRequestUseCase::new(upstream(&server), outbox.clone())
            .execute(
                &JoinRequestId::new("R1").unwrap(),
                Some(HeaderValue::from_static("Bearer moderator")),
            )
            .await
            .unwrap();

        assert_eq!(output.membership, MembershipOutcome::Added);
    }

    #[tokio::test]
    async fn test_reject_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community-join-request/R2/reject"))
            .and(header_is("authorization", "Bearer moderator"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": true, "data": { "status": "rejected" } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        let response = app(&server, &outbox)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/community-join-request/R2/reject")
                    .header(header::AUTHORIZATION, "Bearer moderator")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"]["status"], "rejected");
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_blank_id_rejected_before_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        let response = app(&server, &outbox)
            .oneshot(approve_request("%20"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod reconcile_tests {
    use crate::{
        InMemoryOutbox, JoinRequestConfig, MembershipOutbox, MembershipTarget, OutboxStatus,
        PendingMembership, ReconcileReport, ReconcileWorker,
    };
    use kernel::id::{CommunityId, JoinRequestId, UserId};
    use platform::upstream::UpstreamClient;
    use proxy::HttpUpstream;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header as header_is, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn worker(
        server: &MockServer,
        outbox: &InMemoryOutbox,
        config: JoinRequestConfig,
    ) -> ReconcileWorker<HttpUpstream, InMemoryOutbox> {
        let upstream = HttpUpstream::new(UpstreamClient::new(&server.uri(), None).unwrap());
        ReconcileWorker::new(
            Arc::new(upstream),
            Arc::new(outbox.clone()),
            Arc::new(config),
        )
    }

    fn service_config() -> JoinRequestConfig {
        JoinRequestConfig {
            service_token: Some("svc-token".to_string()),
            ..JoinRequestConfig::default()
        }
    }

    fn queued(target: Option<MembershipTarget>) -> PendingMembership {
        PendingMembership::new(
            JoinRequestId::new("R1").unwrap(),
            target,
            "upstream returned 500",
        )
    }

    fn u1_c1() -> MembershipTarget {
        MembershipTarget {
            user_id: UserId::new("U1").unwrap(),
            community_id: CommunityId::new("C1").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_queued_membership_is_repaired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .and(header_is("authorization", "Bearer svc-token"))
            .and(body_json(json!({ "user_id": "U1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(Some(u1_c1()))).await.unwrap();

        let report = tokio_test::assert_ok!(
            worker(&server, &outbox, service_config()).run_once().await
        );

        assert_eq!(
            report,
            ReconcileReport {
                done: 1,
                retried: 0,
                abandoned: 0
            }
        );
        // Finished entries do not accumulate
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_ids_are_resolved_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/community-join-request/R1"))
            .and(header_is("authorization", "Bearer svc-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": { "id": "R1", "user_id": "U1", "community_id": "C1", "status": "approved" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(None)).await.unwrap();

        let report = worker(&server, &outbox, service_config())
            .run_once()
            .await
            .unwrap();
        assert_eq!(report.done, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_backs_off() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(Some(u1_c1()))).await.unwrap();
        let worker = worker(&server, &outbox, service_config());

        let report = worker.run_once().await.unwrap();
        assert_eq!(report.retried, 1);

        let entry = outbox.entries().await.remove(0);
        assert_eq!(entry.status, OutboxStatus::Pending);
        assert_eq!(entry.attempts, 2);
        assert!(entry.next_attempt_at > chrono::Utc::now());

        // Not due again until the backoff has passed
        assert!(worker.run_once().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(Some(u1_c1()))).await.unwrap();
        let config = JoinRequestConfig {
            max_attempts: 2,
            ..service_config()
        };

        let report = worker(&server, &outbox, config).run_once().await.unwrap();
        assert_eq!(report.abandoned, 1);
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_permanent_failure_is_abandoned_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Community gone" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(Some(u1_c1()))).await.unwrap();

        let report = worker(&server, &outbox, service_config())
            .run_once()
            .await
            .unwrap();
        assert_eq!(report.abandoned, 1);
        assert_eq!(report.retried, 0);
        assert!(outbox.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/community/C1/members"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outbox = InMemoryOutbox::new();
        outbox.enqueue(&queued(Some(u1_c1()))).await.unwrap();
        let worker = worker(&server, &outbox, service_config());

        let report = worker.run_once().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                done: 0,
                retried: 0,
                abandoned: 1
            }
        );
        assert!(worker.run_once().await.unwrap().is_empty());
    }
}
