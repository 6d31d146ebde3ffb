mod common;

use common::{new_year_2025, payment_request, zalopay_gateway, KEY1, KEY2};
use httpmock::prelude::*;
use payment_svc::domain::callback::{CallbackEnvelope, MockCallback, ZalopayCallback};
use payment_svc::domain::payment::{CancelPaymentRequest, PaymentStatus};
use payment_svc::gateways::signature::hmac_sha256_hex;
use payment_svc::gateways::zalopay::app_trans_id;
use payment_svc::gateways::{GatewayError, GatewayType, PaymentGateway};
use serde_json::json;

fn zalopay_callback(data: &str, key: &str) -> CallbackEnvelope {
    CallbackEnvelope::Zalopay(ZalopayCallback {
        data: data.to_string(),
        mac: hmac_sha256_hex(key, data),
    })
}

#[test]
fn trans_id_is_date_prefixed_order_code() {
    assert_eq!(app_trans_id(new_year_2025(), "ORD123"), "250101_ORD123");
}

#[test]
fn order_request_is_signed_with_key1() {
    let gateway = zalopay_gateway("http://unused");
    let order = gateway
        .build_order_request(&payment_request("ORD123", "ZALOPAY"), new_year_2025())
        .unwrap();

    assert_eq!(order.app_trans_id, "250101_ORD123");
    assert_eq!(order.app_user, "user-42");
    assert_eq!(order.amount, 150_000);
    assert_eq!(order.app_time, new_year_2025().timestamp_millis());
    assert_eq!(order.item, "[]");
    assert_eq!(
        order.embed_data,
        r#"{"redirecturl":"https://shop.example/orders/done?bookingCode=ORD123"}"#
    );
    assert_eq!(order.callback_url, "https://payments.example/zalopay/callback");

    let expected_input = format!(
        "2553|250101_ORD123|user-42|150000|{}|{}|[]",
        order.app_time, order.embed_data
    );
    assert_eq!(order.mac_input(), expected_input);
    assert_eq!(order.mac, hmac_sha256_hex(KEY1, &expected_input));
    assert_ne!(order.mac, hmac_sha256_hex(KEY2, &expected_input));
}

#[test]
fn missing_return_url_falls_back_to_configured_default() {
    let gateway = zalopay_gateway("http://unused");
    let mut req = payment_request("ORD1", "ZALOPAY");
    req.metadata.clear();

    let order = gateway.build_order_request(&req, new_year_2025()).unwrap();
    assert_eq!(
        order.embed_data,
        r#"{"redirecturl":"https://shop.example/payment/success?bookingCode=ORD1"}"#
    );

    req.metadata.insert("return_url".to_string(), String::new());
    let order = gateway.build_order_request(&req, new_year_2025()).unwrap();
    assert!(order
        .embed_data
        .contains("https://shop.example/payment/success?bookingCode=ORD1"));
}

#[test]
fn order_mac_is_deterministic_and_field_sensitive() {
    let gateway = zalopay_gateway("http://unused");
    let req = payment_request("ORD123", "ZALOPAY");
    let a = gateway.build_order_request(&req, new_year_2025()).unwrap();
    let b = gateway.build_order_request(&req, new_year_2025()).unwrap();
    assert_eq!(a.mac, b.mac);

    let mut amount = a.clone();
    amount.amount += 1;
    let mut time = a.clone();
    time.app_time += 1;
    let mut embed = a.clone();
    embed.embed_data = r#"{"redirecturl":"https://evil.example"}"#.to_string();

    for changed in [amount, time, embed] {
        assert_ne!(hmac_sha256_hex(KEY1, &changed.mac_input()), a.mac);
    }
}

#[tokio::test]
async fn callback_with_valid_mac_yields_order_code() {
    let gateway = zalopay_gateway("http://unused");
    let envelope = zalopay_callback(r#"{"app_trans_id":"250101_ORD123"}"#, KEY2);

    let order_code = gateway.handle_callback(&envelope).await.unwrap();
    assert_eq!(order_code, "ORD123");
}

#[tokio::test]
async fn callback_signed_with_request_key_is_rejected() {
    let gateway = zalopay_gateway("http://unused");
    let envelope = zalopay_callback(r#"{"app_trans_id":"250101_ORD123"}"#, KEY1);

    let err = gateway.handle_callback(&envelope).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidSignature));
}

#[tokio::test]
async fn tampered_callback_is_rejected() {
    let gateway = zalopay_gateway("http://unused");
    let mac = hmac_sha256_hex(KEY2, r#"{"app_trans_id":"250101_ORD123"}"#);
    let envelope = CallbackEnvelope::Zalopay(ZalopayCallback {
        data: r#"{"app_trans_id":"250101_ORD999"}"#.to_string(),
        mac,
    });

    assert!(matches!(
        gateway.handle_callback(&envelope).await,
        Err(GatewayError::InvalidSignature)
    ));
}

#[tokio::test]
async fn callback_identifier_without_underscore_is_malformed() {
    let gateway = zalopay_gateway("http://unused");
    let envelope = zalopay_callback(r#"{"app_trans_id":"250101ORD123"}"#, KEY2);

    assert!(matches!(
        gateway.handle_callback(&envelope).await,
        Err(GatewayError::MalformedIdentifier(id)) if id == "250101ORD123"
    ));
}

#[tokio::test]
async fn callback_with_unparseable_data_is_malformed() {
    let gateway = zalopay_gateway("http://unused");
    let envelope = zalopay_callback("not json", KEY2);

    assert!(matches!(
        gateway.handle_callback(&envelope).await,
        Err(GatewayError::MalformedPayload(_))
    ));
}

#[tokio::test]
async fn callback_for_another_provider_is_unsupported() {
    let gateway = zalopay_gateway("http://unused");
    let envelope = CallbackEnvelope::Mock(MockCallback {
        order_code: "ORD123".to_string(),
        mac: String::new(),
    });

    assert!(matches!(
        gateway.handle_callback(&envelope).await,
        Err(GatewayError::UnsupportedCallback(GatewayType::Mock))
    ));
}

#[tokio::test]
async fn process_payment_returns_order_url() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v2/create")
                .json_body_partial(r#"{"app_trans_id":"250101_ORD123","amount":150000,"app_id":2553}"#);
            then.status(200).json_body(json!({
                "return_code": 1,
                "return_message": "Giao dịch thành công",
                "sub_return_code": 1,
                "order_url": "https://qcgateway.zalopay.vn/openinapp?order=abc",
                "zp_trans_token": "abc"
            }));
        })
        .await;

    let gateway = zalopay_gateway(&server.base_url());
    let resp = gateway
        .process_payment(&payment_request("ORD123", "ZALOPAY"))
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(resp.payment_url, "https://qcgateway.zalopay.vn/openinapp?order=abc");
    assert_eq!(resp.payment.id, "250101_ORD123");
    assert_eq!(resp.payment.order_code, "ORD123");
    assert_eq!(resp.payment.status, PaymentStatus::Pending);
    assert_eq!(resp.payment.gateway_name, "ZALOPAY");
    assert_eq!(
        resp.metadata.get("return_url").map(String::as_str),
        Some("https://shop.example/orders/done")
    );
}

#[tokio::test]
async fn provider_rejection_carries_return_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/create");
            then.status(200)
                .json_body(json!({"return_code": 2, "return_message": "Giao dịch thất bại"}));
        })
        .await;

    let gateway = zalopay_gateway(&server.base_url());
    let err = gateway
        .process_payment(&payment_request("ORD123", "ZALOPAY"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Provider { return_code: 2, .. }));
    assert!(err.to_string().contains("return_code=2"));
}

#[tokio::test]
async fn invalid_request_never_reaches_provider() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/create");
            then.status(200).json_body(json!({"return_code": 1, "order_url": "x"}));
        })
        .await;

    let gateway = zalopay_gateway(&server.base_url());
    let mut req = payment_request("ORD123", "ZALOPAY");
    req.amount = 0;

    assert!(matches!(
        gateway.process_payment(&req).await,
        Err(GatewayError::InvalidRequest(_))
    ));
    assert_eq!(create.hits_async().await, 0);
}

#[tokio::test]
async fn query_payment_signs_with_key1_and_maps_status() {
    let server = MockServer::start_async().await;
    let expected_mac = hmac_sha256_hex(KEY1, &format!("2553|250101_ORD123|{}", KEY1));
    let query = server
        .mock_async(|when, then| {
            when.method(POST).path("/v2/query").json_body(json!({
                "app_id": 2553,
                "app_trans_id": "250101_ORD123",
                "mac": expected_mac
            }));
            then.status(200).json_body(json!({
                "return_code": 1,
                "return_message": "Giao dịch thành công",
                "is_processing": false,
                "amount": 150000,
                "zp_trans_id": 240101000123i64
            }));
        })
        .await;

    let gateway = zalopay_gateway(&server.base_url());
    let status = gateway.query_payment("250101_ORD123").await.unwrap();

    query.assert_async().await;
    assert_eq!(status.status, PaymentStatus::Completed);
    assert_eq!(status.amount, Some(150_000));
    assert_eq!(status.provider_transaction_id.as_deref(), Some("240101000123"));
}

#[tokio::test]
async fn cancel_is_acknowledged_without_network_call() {
    let gateway = zalopay_gateway("http://127.0.0.1:9");
    gateway
        .cancel_payment(&CancelPaymentRequest {
            order_code: "ORD123".to_string(),
        })
        .await
        .unwrap();

    assert!(matches!(
        gateway
            .cancel_payment(&CancelPaymentRequest {
                order_code: String::new(),
            })
            .await,
        Err(GatewayError::InvalidRequest(_))
    ));
}
