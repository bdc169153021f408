//! End-to-end tests of the Retailer client: headers, tokens, bodies and problem responses.

mod common;

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use bol_api::{
    ApiError, FieldValue, Result, Timestamp, TransporterCode,
    auth::{AccessToken, ClientCredentials, TokenCache, TokenSource},
    client::{
        RetailerApi,
        retailer::{NewOffer, OfferUpdate, RETAILER_DEMO_URL, RETAILER_MEDIA_TYPE, ShipOrderItem},
    },
    transport::{ApiRequest, Method, Transport, TransportResponse},
};
use chrono::{FixedOffset, NaiveDate, TimeZone};
use common::{StubTransport, retailer_api, retailer_fixture, retailer_process_status};
use rust_decimal::Decimal;
use serde_json::Value;

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).expect("should send a JSON body")
}

/// Hands out a new token per fetch and counts invalidations.
#[derive(Debug, Default)]
struct RotatingTokens {
    issued: AtomicUsize,
    invalidated: AtomicUsize,
}

impl TokenSource for RotatingTokens {
    async fn fetch_token(&self) -> Result<AccessToken> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::bearer(format!("token-{n}")))
    }

    async fn invalidate(&self, _rejected: &AccessToken) {
        self.invalidated.fetch_add(1, Ordering::SeqCst);
    }
}

/// Issues `token-1`, `token-2`, ... with a five minute lifetime and counts logins.
#[derive(Debug, Default)]
struct CountingLogins {
    logins: AtomicUsize,
}

impl TokenSource for CountingLogins {
    async fn fetch_token(&self) -> Result<AccessToken> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken { expires_in: Some(299), ..AccessToken::bearer(format!("token-{n}")) })
    }
}

/// Answers after a short delay, refusing requests that carry `token-1`.
#[derive(Debug, Default)]
struct RevokedFirstToken;

impl Transport for RevokedFirstToken {
    async fn send<'a>(&'a self, request: ApiRequest) -> Result<TransportResponse> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if request.header("Authorization") == Some("Bearer token-1") {
            Ok(TransportResponse::new(401, ""))
        } else {
            Ok(TransportResponse::new(200, retailer_fixture("orders.json")))
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_orders_list() {
    let transport = StubTransport::new().respond(200, retailer_fixture("orders.json")).shared();
    let api = retailer_api(&transport);

    let orders = api.orders().list(1, Some("FBR")).await.expect("should list orders");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.as_str(), "https://api.bol.com/retailer/orders");
    assert_eq!(request.query_value("page"), Some("1"));
    assert_eq!(request.query_value("fulfilment-method"), Some("FBR"));
    assert_eq!(request.header("Accept"), Some(RETAILER_MEDIA_TYPE));
    assert_eq!(request.header("Authorization"), Some("Bearer test_access_token"));

    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.text("orderId"), Some("A2K8290LP8"));

    let items: Vec<_> = order.objects("orderItems").collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text("orderItemId"), Some("2012345678"));
    assert_eq!(items[0].text("ean"), Some("0000007740404"));
    assert_eq!(items[0].integer("quantity"), Some(10));
}

#[tokio::test]
async fn test_order_by_id() {
    let transport = StubTransport::new().respond(200, retailer_fixture("order.json")).shared();
    let api = retailer_api(&transport);

    let order = api.orders().get("2K8290LP8").await.expect("should fetch order");
    assert_eq!(transport.last_request().url.path(), "/retailer/orders/2K8290LP8");

    assert_eq!(order.text("orderId"), Some("2K8290LP8"));
    assert_eq!(order.boolean("pickUpPoint"), Some(true));

    let placed = FixedOffset::east_opt(3600)
        .and_then(|cet| cet.with_ymd_and_hms(2017, 2, 9, 12, 39, 48).single())
        .expect("valid timestamp");
    assert_eq!(order.datetime("orderPlacedDateTime"), Some(&Timestamp::Zoned(placed)));

    let shipment = order.object("shipmentDetails").expect("shipment details");
    assert_eq!(shipment.text("pickUpPointName"), Some("Albert Heijn: UTRECHT"));
    assert_eq!(shipment.text("salutation"), Some("MALE"));
    assert_eq!(shipment.text("houseNumber"), Some("1"));
    assert_eq!(shipment.text("language"), Some("nl"));

    let billing = order.object("billingDetails").expect("billing details");
    assert_eq!(billing.text("kvkNumber"), Some("99887766"));
    assert_eq!(billing.text("vatNumber"), Some("NL999999999B99"));
    assert_eq!(billing.text("orderReference"), Some("MijnReferentie"));

    let item = order.objects("orderItems").next().expect("order item");
    assert_eq!(item.boolean("cancellationRequest"), Some(false));
    assert_eq!(item.integer("quantity"), Some(10));
    assert_eq!(item.decimal("unitPrice"), Some(Decimal::new(1299, 2)));
    assert_eq!(item.decimal("commission"), Some(Decimal::new(518, 2)));
    assert_eq!(
        item.path("fulfilment.method").and_then(FieldValue::as_text),
        Some("FBR")
    );
    assert_eq!(
        item.path("fulfilment.latestDeliveryDate").and_then(FieldValue::as_date),
        NaiveDate::from_ymd_opt(2017, 2, 10)
    );
    assert_eq!(
        item.path("offer.offerId").and_then(FieldValue::as_text),
        Some("6ff736b5-cdd0-4150-8c67-78269ee986f5")
    );
    assert_eq!(
        item.path("additionalServices[0].serviceType").and_then(FieldValue::as_text),
        Some("PLACEMENT_AND_INSTALLATION")
    );
}

#[tokio::test]
async fn test_ship_order_item() {
    let transport = StubTransport::new()
        .respond(202, retailer_process_status("CONFIRM_SHIPMENT"))
        .shared();
    let api = retailer_api(&transport);

    let shipment = ShipOrderItem {
        shipment_reference: Some("ref".to_owned()),
        transporter_code: Some(TransporterCode::Tnt),
        track_and_trace: Some("3SAOLD1234567".to_owned()),
        ..ShipOrderItem::default()
    };
    let status = api
        .orders()
        .ship_order_item("2012345678", &shipment)
        .await
        .expect("should ship order item");
    assert_eq!(status.id, 1_234_567);
    assert_eq!(status.event_type, "CONFIRM_SHIPMENT");
    assert_eq!(status.links.len(), 1);
    assert!(status.seller_id.is_none());

    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url.path(), "/retailer/orders/2012345678/shipment");
    assert_eq!(request.header("Content-Type"), Some(RETAILER_MEDIA_TYPE));

    let body = json_body(&request.body_text());
    assert_eq!(body["shipmentReference"], "ref");
    assert_eq!(body["transport"]["transporterCode"], "TNT");
    assert_eq!(body["transport"]["trackAndTrace"], "3SAOLD1234567");
    assert!(body.get("shippingLabelCode").is_none());
}

#[tokio::test]
async fn test_order_id_is_validated() {
    let transport = StubTransport::new().shared();
    let api = retailer_api(&transport);

    let result = api.orders().get("2K8290LP8/../../offers").await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_order_item() {
    let transport = StubTransport::new()
        .respond(202, retailer_process_status("CANCEL_ORDER"))
        .shared();
    let api = retailer_api(&transport);

    let status = api
        .orders()
        .cancel_order_item("2012345678", "REQUESTED_BY_CUSTOMER")
        .await
        .expect("should cancel order item");
    assert_eq!(status.event_type, "CANCEL_ORDER");
    assert!(status.is_pending());

    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url.path(), "/retailer/orders/2012345678/cancellation");
    assert_eq!(
        json_body(&request.body_text()),
        serde_json::json!({"reasonCode": "REQUESTED_BY_CUSTOMER"})
    );
}

// ============================================================================
// Shipments
// ============================================================================

const SHIPMENT_JSON: &str = r#"{
  "shipmentId": 541757635,
  "pickUpPoint": false,
  "shipmentDate": "2018-04-17T10:55:37+02:00",
  "shipmentReference": "BOLCOM001",
  "order": {"orderId": "4123456789", "orderPlacedDateTime": "2018-04-17T10:55:37+02:00"},
  "shipmentItems": [
    {"orderItemId": "1234567891", "ean": "0000007740404", "quantity": 1, "offerPrice": 12.99, "fulfilmentMethod": "FBR"}
  ],
  "transport": {"transportId": "312778947", "transporterCode": "TNT", "trackAndTrace": "3SBOL0987654321"}
}"#;

#[tokio::test]
async fn test_shipments_list_by_order() {
    let body = format!(r#"{{"shipments": [{SHIPMENT_JSON}]}}"#);
    let transport = StubTransport::new().respond(200, body).shared();
    let api = retailer_api(&transport);

    let shipments = api
        .shipments()
        .list(2, Some("FBR"), Some("4123456789"))
        .await
        .expect("should list shipments");

    let request = transport.last_request();
    assert_eq!(request.url.path(), "/retailer/shipments");
    assert_eq!(request.query_value("page"), Some("2"));
    assert_eq!(request.query_value("fulfilment-method"), Some("FBR"));
    assert_eq!(request.query_value("order-id"), Some("4123456789"));

    assert_eq!(shipments.len(), 1);
    let shipment = &shipments[0];
    assert_eq!(shipment.text("shipmentId"), Some("541757635"));
    assert_eq!(
        shipment.path("order.orderId").and_then(FieldValue::as_text),
        Some("4123456789")
    );
    assert_eq!(
        shipment.path("shipmentItems[0].offerPrice").and_then(FieldValue::as_decimal),
        Some(Decimal::new(1299, 2))
    );
    assert_eq!(
        shipment.path("transport.trackAndTrace").and_then(FieldValue::as_text),
        Some("3SBOL0987654321")
    );
}

#[tokio::test]
async fn test_shipment_by_id() {
    let transport = StubTransport::new().respond(200, SHIPMENT_JSON).shared();
    let api = retailer_api(&transport);

    let shipment = api.shipments().get("541757635").await.expect("should fetch shipment");

    assert_eq!(transport.last_request().url.path(), "/retailer/shipments/541757635");
    assert_eq!(shipment.text("shipmentReference"), Some("BOLCOM001"));
    assert_eq!(shipment.boolean("pickUpPoint"), Some(false));
    assert!(shipment.missing_fields().is_empty());
}

// ============================================================================
// Offers
// ============================================================================

#[tokio::test]
async fn test_create_offer() {
    let transport =
        StubTransport::new().respond(202, retailer_process_status("CREATE_OFFER")).shared();
    let api = retailer_api(&transport);

    let mut offer = NewOffer::new("0000007740404", "NEW", Decimal::new(1299, 2), 5);
    offer.reference = Some("REF-1".to_owned());
    offer.fulfilment_type = Some("FBR".to_owned());
    offer.delivery_code = Some("24uurs-23".to_owned());

    let status = api.offers().create(&offer).await.expect("should create offer");
    assert_eq!(status.event_type, "CREATE_OFFER");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.path(), "/retailer/offers");

    let body = json_body(&request.body_text());
    assert_eq!(body["ean"], "0000007740404");
    assert_eq!(body["condition"]["name"], "NEW");
    assert_eq!(body["reference"], "REF-1");
    assert_eq!(body["pricing"]["bundlePrices"][0]["quantity"], 1);
    assert_eq!(body["pricing"]["bundlePrices"][0]["price"].to_string(), "12.99");
    assert_eq!(body["stock"]["amount"], 5);
    assert!(body["stock"].get("managedByRetailer").is_none());
    assert_eq!(body["fulfilment"]["type"], "FBR");
    assert_eq!(body["fulfilment"]["deliveryCode"], "24uurs-23");
    assert!(body.get("onHoldByRetailer").is_none());
}

#[tokio::test]
async fn test_offer_by_id() {
    let body = r#"{
  "offerId": "6ff736b5-cdd0-4150-8c67-78269ee986f5",
  "ean": "0000007740404",
  "onHoldByRetailer": false,
  "pricing": {"bundlePrices": [{"quantity": 1, "price": 9.99}]},
  "stock": {"amount": 6, "correctedStock": 5, "managedByRetailer": false},
  "condition": {"name": "NEW"}
}"#;
    let transport = StubTransport::new().respond(200, body).shared();
    let api = retailer_api(&transport);

    let offer = api
        .offers()
        .get("6ff736b5-cdd0-4150-8c67-78269ee986f5")
        .await
        .expect("should fetch offer");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.path(), "/retailer/offers/6ff736b5-cdd0-4150-8c67-78269ee986f5");
    assert_eq!(offer.text("ean"), Some("0000007740404"));
    assert_eq!(
        offer.path("pricing.bundlePrices[0].price").and_then(FieldValue::as_decimal),
        Some(Decimal::new(999, 2))
    );
    assert_eq!(offer.path("stock.correctedStock"), Some(&FieldValue::Integer(5)));
    assert_eq!(offer.path("condition.name").and_then(FieldValue::as_text), Some("NEW"));
}

#[tokio::test]
async fn test_update_offer_price_and_stock() {
    let transport =
        StubTransport::new().respond(202, retailer_process_status("UPDATE_OFFER")).shared();
    let api = retailer_api(&transport);
    let offer_id = "6ff736b5-cdd0-4150-8c67-78269ee986f5";

    api.offers()
        .update_price(offer_id, Decimal::new(2450, 2))
        .await
        .expect("should update price");
    let request = transport.last_request();
    assert_eq!(request.url.path(), format!("/retailer/offers/{offer_id}/price"));
    let body = json_body(&request.body_text());
    assert_eq!(body["pricing"]["bundlePrices"][0]["price"].to_string(), "24.5");

    api.offers().update_stock(offer_id, 3, true).await.expect("should update stock");
    let body = json_body(&transport.last_request().body_text());
    assert_eq!(body["amount"], 3);
    assert_eq!(body["managedByRetailer"], true);

    let update = OfferUpdate { on_hold_by_retailer: Some(true), ..OfferUpdate::default() };
    api.offers().update(offer_id, &update).await.expect("should update offer");
    let body = json_body(&transport.last_request().body_text());
    assert_eq!(body, serde_json::json!({"onHoldByRetailer": true}));
}

#[tokio::test]
async fn test_delete_offer_has_no_body() {
    let transport =
        StubTransport::new().respond(202, retailer_process_status("DELETE_OFFER")).shared();
    let api = retailer_api(&transport);

    api.offers()
        .delete("6ff736b5-cdd0-4150-8c67-78269ee986f5")
        .await
        .expect("should delete offer");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Delete);
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_request_offer_export() {
    let transport = StubTransport::new()
        .respond(202, retailer_process_status("CREATE_OFFER_EXPORT"))
        .shared();
    let api = retailer_api(&transport);

    api.offers().request_export().await.expect("should request export");

    let request = transport.last_request();
    assert_eq!(request.url.path(), "/retailer/offers/export");
    assert_eq!(json_body(&request.body_text()), serde_json::json!({"format": "CSV"}));
}

// ============================================================================
// Returns
// ============================================================================

#[tokio::test]
async fn test_returns_list_and_handle() {
    let returns = r#"{"returns": [{
        "rmaId": "31234567",
        "orderId": "4123456789",
        "ean": "9781781103524",
        "quantity": 1,
        "registrationDateTime": "2016-11-14T10:12:00+01:00",
        "returnReason": "Niet naar verwachting",
        "fulfilmentMethod": "FBR",
        "handled": false
    }]}"#;
    let transport = StubTransport::new()
        .respond(200, returns)
        .respond(202, retailer_process_status("HANDLE_RETURN_ITEM"))
        .shared();
    let api = retailer_api(&transport);

    let items = api.returns().list(1, Some(false), None).await.expect("should list returns");
    assert_eq!(transport.last_request().query_value("handled"), Some("false"));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text("rmaId"), Some("31234567"));
    assert_eq!(items[0].boolean("handled"), Some(false));

    api.returns()
        .handle(31_234_567, "RETURN_RECEIVED", 1)
        .await
        .expect("should handle return");
    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url.path(), "/retailer/returns/31234567");
    assert_eq!(
        json_body(&request.body_text()),
        serde_json::json!({"handlingResult": "RETURN_RECEIVED", "quantityReturned": 1})
    );
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let transport = StubTransport::new()
        .respond(401, "")
        .respond(200, retailer_fixture("orders.json"))
        .shared();
    let api = RetailerApi::new(transport.clone(), RotatingTokens::default());

    let orders = api.orders().list(1, None).await.expect("should retry with a fresh token");
    assert_eq!(orders.len(), 1);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("Authorization"), Some("Bearer token-0"));
    assert_eq!(requests[1].header("Authorization"), Some("Bearer token-1"));
    assert_eq!(api.tokens().invalidated.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_rejection_is_returned() {
    let transport = StubTransport::new().respond(401, "Unauthorized").shared();
    let api = RetailerApi::new(transport.clone(), RotatingTokens::default());

    let error = api.orders().list(1, None).await.expect_err("should fail");
    assert_eq!(error.status(), Some(401));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_client_credentials_token_is_cached() {
    let transport = StubTransport::new()
        .respond(200, retailer_fixture("token.json"))
        .respond(200, retailer_fixture("orders.json"))
        .shared();
    let tokens = TokenCache::new(ClientCredentials::new(transport.clone(), "api_key", "api_secret"));
    let api = RetailerApi::new(transport.clone(), tokens);

    api.orders().list(1, None).await.expect("should list orders");
    api.orders().list(2, None).await.expect("should list orders again");

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].url.as_str(), "https://login.bol.com/token");
    assert_eq!(requests[0].query_value("grant_type"), Some("client_credentials"));
    assert_eq!(requests[1].header("Authorization"), Some("Bearer test_access_token"));
    assert_eq!(requests[2].query_value("page"), Some("2"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_rejections_share_one_login() {
    let api = RetailerApi::new(RevokedFirstToken, TokenCache::new(CountingLogins::default()));
    let orders = api.orders();

    let (first, second, third, fourth) = tokio::join!(
        orders.list(1, None),
        orders.list(2, None),
        orders.list(3, None),
        orders.list(4, None),
    );

    for result in [first, second, third, fourth] {
        assert_eq!(result.expect("should list with the refreshed token").len(), 1);
    }
    assert_eq!(api.tokens().source().logins.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Environment and errors
// ============================================================================

#[tokio::test]
async fn test_demo_environment() {
    let transport = StubTransport::new().respond(200, retailer_fixture("orders.json")).shared();
    let api = retailer_api(&transport).with_demo_environment(true);
    assert_eq!(api.base_url(), RETAILER_DEMO_URL);

    api.orders().list(1, None).await.expect("should list orders");
    assert_eq!(transport.last_request().url.path(), "/retailer-demo/orders");
}

#[tokio::test]
async fn test_problem_response() {
    let problem = r#"{
        "type": "http://api.bol.com/problems",
        "title": "Error validating request",
        "status": 400,
        "detail": "Bad request",
        "host": "Instance-111",
        "instance": "https://api.bol.com/retailer/offers",
        "violations": [{"name": "ean", "reason": "Request contains invalid value(s): 'abc'."}]
    }"#;
    let transport = StubTransport::new().respond(400, problem).shared();
    let api = retailer_api(&transport);

    let offer = NewOffer::new("abc", "NEW", Decimal::ONE, 1);
    let error = api.offers().create(&offer).await.expect_err("should be rejected");
    assert_eq!(error.status(), Some(400));

    let ApiError::Marketplace(error) = error else {
        panic!("expected marketplace error, got {error:?}");
    };
    assert_eq!(error.code.as_deref(), Some("Error validating request"));
    assert_eq!(error.description, "Bad request");
    assert_eq!(error.violations.len(), 1);
    assert_eq!(error.violations[0].name, "ean");
}

#[tokio::test]
async fn test_not_found_without_body() {
    let transport = StubTransport::new().respond(404, "").shared();
    let api = retailer_api(&transport);

    let error = api.process_status().get(1).await.expect_err("should fail");
    assert_eq!(error.status(), Some(404));
}
