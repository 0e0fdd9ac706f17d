use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::config::GatewayConfig;
use crate::gateway::test_helpers::ScriptedTransport;
use crate::gateway::{FixedPlatform, HttpResponse};
use crate::storage::MemoryStorage;

fn api_with(transport: Arc<ScriptedTransport>) -> FarmstayApi {
    FarmstayApi::new(RequestGateway::new(
        GatewayConfig::default(),
        transport,
        Some(Arc::new(MemoryStorage::new())),
        Arc::new(FixedPlatform::new("/")),
    ))
}

fn paths(transport: &ScriptedTransport) -> Vec<String> {
    transport
        .requests()
        .into_iter()
        .map(|r| {
            r.url
                .trim_start_matches("http://localhost:8080")
                .to_owned()
        })
        .collect()
}

// =============================================================================
// with_query
// =============================================================================

#[test]
fn with_query_skips_missing_and_empty_values() {
    assert_eq!(with_query("/api/home/recommendations", &[("city", None), ("tag", Some(""))]), "/api/home/recommendations");
    assert_eq!(
        with_query("/api/home/recommendations", &[("city", Some("Hangzhou")), ("priceLevel", None), ("tag", Some("tea"))]),
        "/api/home/recommendations?city=Hangzhou&tag=tea"
    );
}

#[test]
fn with_query_form_encodes_values() {
    assert_eq!(
        with_query("/api/farmstays/search/", &[("keyword", Some("lake view & tea"))]),
        "/api/farmstays/search/?keyword=lake+view+%26+tea"
    );
}

// =============================================================================
// paths and methods
// =============================================================================

#[tokio::test]
async fn listing_endpoints_use_expected_paths() {
    let transport = ScriptedTransport::ok_each(vec![
        json!({ "banners": [] }),
        json!([{ "id": 1, "name": "Maple" }]),
        json!([]),
        json!({ "id": 5 }),
        json!({ "id": 6 }),
        json!({ "id": 6 }),
    ]);
    let api = api_with(transport.clone());

    api.overview().await.unwrap();
    let recs = api
        .recommendations(&RecommendationFilters { city: Some("Hangzhou".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(recs[0].name.as_deref(), Some("Maple"));
    api.search_farmstays(&SearchFilters {
        keyword: Some("tea".into()),
        price_level: Some("LOW".into()),
        ..Default::default()
    })
    .await
    .unwrap();
    api.farmstay_detail(5).await.unwrap();
    api.create_farmstay(&json!({ "name": "New" })).await.unwrap();
    api.update_farmstay(6, &json!({ "name": "Renamed" })).await.unwrap();

    assert_eq!(
        paths(&transport),
        vec![
            "/api/home/overview",
            "/api/home/recommendations?city=Hangzhou",
            "/api/farmstays/search/?keyword=tea&priceLevel=LOW",
            "/api/farmstays/5",
            "/api/farmstays",
            "/api/farmstays/6",
        ]
    );
    let methods: Vec<Method> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::Get, Method::Get, Method::Get, Method::Get, Method::Post, Method::Put]);
}

#[tokio::test]
async fn room_and_booking_endpoints_use_expected_paths() {
    let booking = json!({ "id": 9, "orderNo": "FS-9", "status": "PENDING", "totalAmount": 388.0 });
    let transport = ScriptedTransport::ok_each(vec![
        json!([{ "id": 3, "farmStayId": 5, "bedType": "double", "maxGuests": 2, "price": 199.0 }]),
        json!({ "id": 3 }),
        json!({ "id": 3 }),
        booking.clone(),
        json!(null),
        json!(null),
        json!(null),
        json!([booking.clone()]),
        json!([]),
    ]);
    let api = api_with(transport.clone());

    let rooms = api.list_rooms(5).await.unwrap();
    assert_eq!(rooms[0].max_guests, Some(2));
    api.create_room(&json!({ "farmStayId": 5 })).await.unwrap();
    api.update_room(3, &json!({ "price": 219 })).await.unwrap();
    let created = api.create_booking(&json!({ "roomId": 3 })).await.unwrap();
    assert_eq!(created.order_no, "FS-9");
    api.pay_booking(&json!({ "orderId": 9 })).await.unwrap();
    api.cancel_booking(9).await.unwrap();
    api.update_booking_status(&json!({ "orderId": 9, "status": "DONE" }))
        .await
        .unwrap();
    let mine = api.my_bookings().await.unwrap();
    assert_eq!(mine[0].status, "PENDING");
    api.owner_bookings(5).await.unwrap();

    assert_eq!(
        paths(&transport),
        vec![
            "/api/rooms?farmStayId=5",
            "/api/rooms",
            "/api/rooms/3",
            "/api/bookings",
            "/api/bookings/pay",
            "/api/bookings/9/cancel",
            "/api/bookings/status",
            "/api/bookings/mine",
            "/api/bookings?farmStayId=5",
        ]
    );
    let requests = transport.requests();
    assert_eq!(requests[5].method, Method::Post);
    assert_eq!(requests[5].body, None);
    assert_eq!(requests[6].method, Method::Put);
}

#[tokio::test]
async fn review_and_coupon_endpoints_use_expected_paths() {
    let transport = ScriptedTransport::ok_each(vec![
        json!([]),
        json!({ "id": 1 }),
        json!(null),
        json!([]),
        json!([]),
        json!({ "id": 2 }),
    ]);
    let api = api_with(transport.clone());

    api.list_reviews(5).await.unwrap();
    api.create_review(&json!({ "rating": 5 })).await.unwrap();
    api.moderate_review(1, "APPROVED").await.unwrap();
    api.list_coupons(None).await.unwrap();
    api.list_coupons(Some(5)).await.unwrap();
    api.create_coupon(&json!({ "amount": 20 })).await.unwrap();

    assert_eq!(
        paths(&transport),
        vec![
            "/api/reviews?farmStayId=5",
            "/api/reviews",
            "/api/reviews/1/status?status=APPROVED",
            "/api/coupons",
            "/api/coupons?farmStayId=5",
            "/api/coupons",
        ]
    );
    assert_eq!(transport.requests()[2].method, Method::Put);
}

// =============================================================================
// auth flows
// =============================================================================

#[tokio::test]
async fn login_and_store_persists_session() {
    let transport = ScriptedTransport::ok_each(vec![json!({ "token": "tok-9", "loginType": "GUEST", "expire": 1 })]);
    let api = api_with(transport.clone());

    let request = LoginRequest { username: "alice".into(), password: "pw".into(), user_type: "GUEST".into() };
    let record = api.login_and_store(&request).await.unwrap();

    assert_eq!(record.token, "tok-9");
    assert_eq!(record.username.as_deref(), Some("alice"));
    assert_eq!(api.gateway().session().read(), Some(record));

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Post);
    let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "username": "alice", "password": "pw", "userType": "GUEST" }));
}

#[tokio::test]
async fn register_and_store_keeps_display_name() {
    let transport = ScriptedTransport::ok_each(vec![json!({ "token": "t", "loginType": "OWNER", "expire": 2 })]);
    let api = api_with(transport.clone());

    let request = RegisterRequest {
        username: "bob".into(),
        password: "pw".into(),
        user_type: "OWNER".into(),
        display_name: Some("Bob's Farm".into()),
    };
    let record = api.register_and_store(&request).await.unwrap();
    assert_eq!(record.display_name.as_deref(), Some("Bob's Farm"));
    assert_eq!(paths(&transport), vec!["/api/auth/register"]);
}

#[tokio::test]
async fn failed_login_stores_nothing() {
    let transport = ScriptedTransport::new(vec![Ok(HttpResponse {
        status: 200,
        body: json!({ "code": 401, "message": "wrong password" }).to_string(),
    })]);
    let api = api_with(transport);

    let request = LoginRequest { username: "alice".into(), password: "nope".into(), user_type: "GUEST".into() };
    let err = api.login_and_store(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "wrong password");
    assert_eq!(api.gateway().session().read(), None);
    assert_eq!(api.gateway().redirect().peek(), None);
}

#[tokio::test]
async fn logout_clears_session() {
    let transport = ScriptedTransport::ok_each(vec![json!({ "token": "t", "loginType": "GUEST", "expire": 0 })]);
    let api = api_with(transport);
    let request = LoginRequest { username: "a".into(), password: "b".into(), user_type: "GUEST".into() };
    api.login_and_store(&request).await.unwrap();

    api.logout();
    api.logout();
    assert_eq!(api.gateway().session().read(), None);
}
