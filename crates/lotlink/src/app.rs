use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        dealers::{create_dealer, get_dealer, list_dealers},
        deliveries::{
            accept, create_delivery, get_delivery, list_deliveries, update_delivery,
            update_status,
        },
        drivers::{create_driver, get_driver, list_drivers, update_driver},
        events::events_sse,
        health::{healthz, livez},
        messages::{
            count_messages, get_message, list_messages, mark_conversation_read,
            mark_message_read, send_message,
        },
        sales_users::{create_sales_user, get_sales_user, list_sales_users},
        unread::unread_sse,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::HeaderName::from_static("last-event-id")]);

    let api_routes = Router::new()
        // Dealer routes
        .route("/dealers", get(list_dealers).post(create_dealer))
        .route("/dealers/{id}", get(get_dealer))
        // Sales user routes
        .route("/sales-users", get(list_sales_users).post(create_sales_user))
        .route("/sales-users/{id}", get(get_sales_user))
        // Driver routes
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/{id}", get(get_driver).patch(update_driver))
        // Delivery routes
        .route("/deliveries", get(list_deliveries).post(create_delivery))
        .route("/deliveries/{id}", get(get_delivery).put(update_delivery))
        .route("/deliveries/{id}/accept", post(accept))
        .route("/deliveries/{id}/status", post(update_status))
        // Chat routes
        .route(
            "/deliveries/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/deliveries/{id}/messages/read", post(mark_conversation_read))
        .route("/messages/count", get(count_messages))
        .route("/messages/{id}", get(get_message))
        .route("/messages/{id}/read", post(mark_message_read))
        // Real-time routes
        .route("/events", get(events_sse))
        .route("/deliveries/{id}/unread", get(unread_sse))
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use lotlink_core::marketplace::{
        accept_delivery, Dealer, Delivery, DeliveryKind, DeliveryStatus, Driver, Message,
        SalesUser,
    };
    use lotlink_core::realtime::ChangeFilter;

    const VIN: &str = "1HGCM82633A004352";

    /// A dealer, sales user, driver and an accepted delivery between them.
    struct Marketplace {
        sales_user: SalesUser,
        driver: Driver,
        delivery: Delivery,
    }

    async fn seed_marketplace(state: &AppState) -> Marketplace {
        let dealer = Dealer::new("Harbor City Auto");
        let sales_user = SalesUser::new(dealer.id, "Maya", "maya@example.com");
        let driver = Driver::new("Luis", "luis@example.com");
        let mut delivery = Delivery::new(
            sales_user.id,
            DeliveryKind::Delivery,
            VIN,
            "500 Harbor Blvd",
            "18 Willow Lane",
        );
        accept_delivery(&mut delivery, driver.id).unwrap();

        state.dealer_repo.create_dealer(&dealer).await.unwrap();
        state
            .sales_user_repo
            .create_sales_user(&sales_user)
            .await
            .unwrap();
        state.driver_repo.create_driver(&driver).await.unwrap();
        state.delivery_repo.create_delivery(&delivery).await.unwrap();

        Marketplace {
            sales_user,
            driver,
            delivery,
        }
    }

    fn get_request(uri: impl AsRef<str>) -> Request<Body> {
        Request::builder()
            .uri(uri.as_ref())
            .body(Body::empty())
            .unwrap()
    }

    fn form_request(method: &str, uri: impl AsRef<str>, body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.into()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn next_chunk(body: &mut Body) -> String {
        let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
            .await
            .expect("timed out waiting for SSE frame")
            .expect("stream ended")
            .expect("body error");
        let data = frame.into_data().expect("expected a data frame");
        String::from_utf8(data.to_vec()).unwrap()
    }

    /// Collects every frame that arrives before `quiet` passes without one.
    async fn drain_chunks(body: &mut Body, quiet: Duration) -> Vec<String> {
        let mut chunks = Vec::new();
        while let Ok(Some(Ok(frame))) = tokio::time::timeout(quiet, body.frame()).await {
            if let Ok(data) = frame.into_data() {
                chunks.push(String::from_utf8(data.to_vec()).unwrap());
            }
        }
        chunks
    }

    async fn wait_for_chunk(body: &mut Body, needle: &str) -> String {
        loop {
            let chunk = next_chunk(body).await;
            if chunk.contains(needle) {
                return chunk;
            }
        }
    }

    #[tokio::test]
    async fn test_livez() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/livez")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_reports_stats() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/healthz")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["healthy"], true);
        assert_eq!(json["event_history_size"], 0);
    }

    #[tokio::test]
    async fn test_list_dealers_empty() {
        let app = create_app(AppState::default());

        let response = app.oneshot(get_request("/api/dealers")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_create_and_get_dealer() {
        let app = create_app(AppState::default());

        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                "/api/dealers",
                "name=Main+Street+Motors&address=1+Main+St",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let dealer = json_body(response).await;
        assert_eq!(dealer["name"], "Main Street Motors");
        assert_eq!(dealer["address"], "1 Main St");

        let dealer_id = dealer["id"].as_str().unwrap();
        let response = app
            .oneshot(get_request(format!("/api/dealers/{dealer_id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_nonexistent_delivery() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request(
                "/api/deliveries/00000000-0000-0000-0000-000000000000",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_sales_user_requires_dealer() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(form_request(
                "POST",
                "/api/sales-users",
                format!(
                    "dealer_id={}&name=Ann&email=ann@example.com",
                    Uuid::new_v4()
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_driver_availability_patch() {
        let state = AppState::default();
        let driver = Driver::new("Luis", "luis@example.com");
        state.driver_repo.create_driver(&driver).await.unwrap();
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(form_request(
                "PATCH",
                format!("/api/drivers/{}", driver.id),
                "available=false",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["available"], false);

        let response = app
            .oneshot(get_request("/api/drivers?available=true"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_delivery_lifecycle() {
        let state = AppState::default();
        let dealer = Dealer::new("Harbor City Auto");
        let sales_user = SalesUser::new(dealer.id, "Maya", "maya@example.com");
        let driver = Driver::new("Luis", "luis@example.com");
        state.dealer_repo.create_dealer(&dealer).await.unwrap();
        state
            .sales_user_repo
            .create_sales_user(&sales_user)
            .await
            .unwrap();
        state.driver_repo.create_driver(&driver).await.unwrap();
        let app = create_app(state);

        // Request
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                "/api/deliveries",
                format!(
                    "sales_user_id={}&kind=swap&vin=1hgcm82633a004352\
                     &pickup_address=500+Harbor+Blvd&dropoff_address=18+Willow+Lane",
                    sales_user.id
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let delivery = json_body(response).await;
        assert_eq!(delivery["status"], "requested");
        assert_eq!(delivery["vin"], VIN);
        let id = delivery["id"].as_str().unwrap().to_string();

        // Skipping ahead is rejected
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{id}/status"),
                "status=delivered",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Accept
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{id}/accept"),
                format!("driver_id={}", driver.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let accepted = json_body(response).await;
        assert_eq!(accepted["status"], "accepted");
        assert_eq!(accepted["driver_id"], driver.id.to_string());

        // Accepting twice is rejected
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{id}/accept"),
                format!("driver_id={}", driver.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        for status in ["in_transit", "delivered"] {
            let response = app
                .clone()
                .oneshot(form_request(
                    "POST",
                    format!("/api/deliveries/{id}/status"),
                    format!("status={status}"),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        // Finished deliveries cannot be edited
        let response = app
            .clone()
            .oneshot(form_request(
                "PUT",
                format!("/api/deliveries/{id}"),
                "notes=late+change",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(get_request(format!(
                "/api/deliveries?driver_id={}&status=delivered",
                driver.id
            )))
            .await
            .unwrap();
        let list = json_body(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_accepts_assign_one_driver() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let rival = Driver::new("Ana", "ana@example.com");
        state.driver_repo.create_driver(&rival).await.unwrap();
        let delivery = Delivery::new(
            market.sales_user.id,
            DeliveryKind::Swap,
            VIN,
            "500 Harbor Blvd",
            "9 Dock Street",
        );
        state.delivery_repo.create_delivery(&delivery).await.unwrap();
        let app = create_app(state.clone());

        let accept_as = |driver_id: Uuid| {
            app.clone().oneshot(form_request(
                "POST",
                format!("/api/deliveries/{}/accept", delivery.id),
                format!("driver_id={driver_id}"),
            ))
        };
        let (first, second) = tokio::join!(accept_as(market.driver.id), accept_as(rival.id));
        let mut statuses = [first.unwrap().status(), second.unwrap().status()];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

        let stored = state
            .delivery_repo
            .get_delivery(delivery.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, DeliveryStatus::Accepted);
        assert!(stored.driver_id == Some(market.driver.id) || stored.driver_id == Some(rival.id));
    }

    #[tokio::test]
    async fn test_create_delivery_rejects_short_vin() {
        let state = AppState::default();
        let sales_user = SalesUser::new(Uuid::new_v4(), "Maya", "maya@example.com");
        state
            .sales_user_repo
            .create_sales_user(&sales_user)
            .await
            .unwrap();
        let app = create_app(state);

        let response = app
            .oneshot(form_request(
                "POST",
                "/api/deliveries",
                format!(
                    "sales_user_id={}&kind=delivery&vin=ABC123\
                     &pickup_address=a&dropoff_address=b",
                    sales_user.id
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_and_unread_count() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state);
        let delivery_id = market.delivery.id;

        // Recipient defaults to the other participant
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{delivery_id}/messages"),
                format!("sender_id={}&body=Keys+at+front+desk", market.sales_user.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let message = json_body(response).await;
        assert_eq!(message["recipient_id"], market.driver.id.to_string());
        assert_eq!(message["read"], false);

        let count_uri = format!(
            "/api/messages/count?delivery_id={delivery_id}&recipient_id={}&read=false",
            market.driver.id
        );
        let response = app.clone().oneshot(get_request(&count_uri)).await.unwrap();
        assert_eq!(json_body(response).await["count"], 1);

        // Mark it read
        let message_id = message["id"].as_str().unwrap();
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/messages/{message_id}/read"),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["read"], true);

        let response = app.clone().oneshot(get_request(&count_uri)).await.unwrap();
        assert_eq!(json_body(response).await["count"], 0);

        let response = app
            .oneshot(get_request(format!("/api/deliveries/{delivery_id}/messages")))
            .await
            .unwrap();
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_outsider_cannot_send() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state);

        let response = app
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{}/messages", market.delivery.id),
                format!("sender_id={}&body=hello", Uuid::new_v4()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state);

        let response = app
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{}/messages", market.delivery.id),
                format!("sender_id={}&body=+++", market.driver.id),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_events_stream_delivers_inserts() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state);
        let delivery_id = market.delivery.id;

        let response = app
            .clone()
            .oneshot(get_request(format!(
                "/api/events?table=messages&conversation_id={delivery_id}"
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut body = response.into_body();

        let response = app
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{delivery_id}/messages"),
                format!("sender_id={}&body=On+my+way", market.driver.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let chunk = wait_for_chunk(&mut body, "On my way").await;
        assert!(chunk.contains("event: insert"));
    }

    #[tokio::test]
    async fn test_events_stream_replays_missed_events() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let delivery_id = market.delivery.id;
        let filter = ChangeFilter::messages(delivery_id);

        let _listener = state.ensure_event_listener(filter).await.unwrap();
        for body in ["first", "second"] {
            let message = Message::new(delivery_id, market.driver.id, market.sales_user.id, body);
            state.message_repo.create_message(&message).await.unwrap();
        }
        tokio::time::timeout(Duration::from_secs(2), async {
            while state.get_events_since(filter, 0).len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        let first_id = state.get_events_since(filter, 0)[0].id;

        let app = create_app(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/events?table=messages&conversation_id={delivery_id}"
                    ))
                    .header("Last-Event-ID", first_id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let mut body = response.into_body();

        let chunk = next_chunk(&mut body).await;
        assert!(chunk.contains("second"));
        assert!(!chunk.contains("first"));
    }

    #[tokio::test]
    async fn test_events_stream_releases_listener_on_disconnect() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state.clone());
        let uri = format!(
            "/api/events?table=messages&conversation_id={}",
            market.delivery.id
        );

        let first = app.clone().oneshot(get_request(&uri)).await.unwrap();
        let second = app.oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(state.active_listener_count(), 1);

        drop(first);
        assert_eq!(state.active_listener_count(), 1);

        drop(second);
        assert_eq!(state.active_listener_count(), 0);
    }

    #[tokio::test]
    async fn test_unread_stream_tracks_inserts_and_reads() {
        let state = AppState::default();
        let market = seed_marketplace(&state).await;
        let app = create_app(state);
        let delivery_id = market.delivery.id;

        let unread_uri = |user_id: Uuid| {
            format!("/api/deliveries/{delivery_id}/unread?user_id={user_id}")
        };

        let response = app
            .clone()
            .oneshot(get_request(unread_uri(market.driver.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut body = response.into_body();

        let response = app
            .clone()
            .oneshot(get_request(unread_uri(market.sales_user.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let mut sender_body = response.into_body();

        let first = next_chunk(&mut body).await;
        assert!(first.contains("\"count\":0"));
        let first = next_chunk(&mut sender_body).await;
        assert!(first.contains("\"count\":0"));
        // Give the counters a moment to open their subscriptions.
        tokio::time::sleep(Duration::from_millis(100)).await;

        // A message to the driver bumps the driver's count
        let response = app
            .clone()
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{delivery_id}/messages"),
                format!("sender_id={}&body=Gate+code+4411", market.sales_user.id),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        wait_for_chunk(&mut body, "\"count\":1").await;

        // and leaves the sender's count alone
        let sender_chunks = drain_chunks(&mut sender_body, Duration::from_millis(300)).await;
        assert!(sender_chunks.iter().all(|chunk| chunk.contains("\"count\":0")));

        // Reading the conversation triggers a recount
        let response = app
            .oneshot(form_request(
                "POST",
                format!("/api/deliveries/{delivery_id}/messages/read"),
                format!("recipient_id={}", market.driver.id),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["count"], 1);
        wait_for_chunk(&mut body, "\"count\":0").await;
    }

    #[tokio::test]
    async fn test_unread_stream_unknown_delivery() {
        let app = create_app(AppState::default());

        let response = app
            .oneshot(get_request(format!(
                "/api/deliveries/{}/unread?user_id={}",
                Uuid::new_v4(),
                Uuid::new_v4()
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
