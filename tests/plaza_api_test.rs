//! End-to-end tests of the Plaza client against recorded marketplace responses.

mod common;

use bol_api::{
    ApiError, FieldValue, Timestamp, TransporterCode,
    client::plaza::{ChangeTransport, CreateShipment, InventoryQuery, PLAZA_TEST_URL, PLAZA_URL},
    transport::Method,
};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use common::{StubTransport, plaza_api, plaza_fixture};
use rust_decimal::Decimal;

fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .expect("valid date")
}

fn cest() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).expect("valid offset")
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_orders_list() {
    let transport = StubTransport::new().respond(200, plaza_fixture("orders.xml")).shared();
    let api = plaza_api(&transport);

    let orders = api.orders().list(1, None).await.expect("should list orders");
    assert_eq!(orders.len(), 1);

    let order = &orders[0];
    assert_eq!(order.text("OrderId"), Some("123"));
    assert_eq!(
        order.datetime("DateTimeCustomer"),
        Some(&Timestamp::Naive(naive(2015, 9, 23, 12, 30, 36)))
    );

    let billing = order.path("CustomerDetails.BillingDetails").and_then(FieldValue::as_object);
    let billing = billing.expect("billing details");
    assert_eq!(billing.integer("SalutationCode"), Some(2));
    assert_eq!(billing.text("Firstname"), Some("Jans"));
    assert_eq!(billing.text("Surname"), Some("Janssen"));
    assert_eq!(billing.text("Streetname"), Some("Billingstraat"));
    assert_eq!(billing.integer("Housenumber"), Some(1));
    assert_eq!(billing.text("HousenumberExtended"), Some("a"));
    assert_eq!(billing.text("AddressSupplement"), Some("Onder de brievenbus"));
    assert_eq!(billing.text("ZipCode"), Some("5000 ZZ"));
    assert_eq!(billing.text("DeliveryPhoneNumber"), Some("67890"));
    assert_eq!(billing.text("Company"), Some("Bol.com"));

    let shipment = &order["CustomerDetails"];
    let shipment = shipment.as_object().and_then(|c| c.object("ShipmentDetails"));
    let shipment = shipment.expect("shipment details");
    assert_eq!(shipment.integer("SalutationCode"), Some(1));
    assert_eq!(shipment.integer("Housenumber"), Some(42));
    assert_eq!(shipment.text("HousenumberExtended"), Some("bis"));
    assert_eq!(shipment.text("Email"), Some("nospam4me@myaccount.com"));

    let items: Vec<_> = order.objects("OrderItems").collect();
    assert_eq!(items.len(), 1);
    let item = items[0];
    assert_eq!(item.text("OrderItemId"), Some("123"));
    assert_eq!(item.text("EAN"), Some("9789062387410"));
    assert_eq!(item.text("OfferReference"), Some("PARTNERREF001"));
    assert_eq!(item.integer("Quantity"), Some(1));
    assert_eq!(item.decimal("OfferPrice"), Some(Decimal::new(12345, 2)));
    assert_eq!(item.decimal("TransactionFee"), Some(Decimal::new(1912, 2)));
    assert_eq!(item.text("PromisedDeliveryDate"), Some("Binnen 24 uur"));
}

#[tokio::test]
async fn test_orders_request_is_signed() {
    let transport = StubTransport::new().respond(200, plaza_fixture("orders.xml")).shared();
    let api = plaza_api(&transport);

    api.orders().list(2, Some("FBB")).await.expect("should list orders");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.as_str(), format!("{PLAZA_TEST_URL}/services/rest/orders/v2"));
    assert_eq!(request.query_value("page"), Some("2"));
    assert_eq!(request.query_value("fulfilment-method"), Some("FBB"));
    assert_eq!(request.header("Content-Type"), Some("application/xml; charset=UTF-8"));
    assert!(request.header("X-BOL-Date").is_some_and(|date| date.ends_with(" GMT")));
    assert!(
        request
            .header("X-BOL-Authorization")
            .is_some_and(|auth| auth.starts_with("api_key:"))
    );
}

#[tokio::test]
async fn test_production_environment_is_default() {
    let transport = StubTransport::new().respond(200, plaza_fixture("orders.xml")).shared();
    let api = plaza_api(&transport).with_test_environment(false);
    assert_eq!(api.base_url(), PLAZA_URL);

    api.orders().list(1, None).await.expect("should list orders");
    assert_eq!(transport.last_request().url.host_str(), Some("plazaapi.bol.com"));
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_payments_list() {
    let transport = StubTransport::new().respond(200, plaza_fixture("payments.xml")).shared();
    let api = plaza_api(&transport);

    let payments = api.payments().list(2015, 1).await.expect("should list payments");
    assert_eq!(transport.last_request().url.path(), "/services/rest/payments/v2/201501");

    assert_eq!(payments.len(), 1);
    let payment = &payments[0];
    assert_eq!(payment.decimal("PaymentAmount"), Some(Decimal::new(42577, 2)));
    assert_eq!(
        payment.datetime("DateTimePayment"),
        Some(&Timestamp::Naive(naive(2015, 9, 23, 21, 35, 43)))
    );
    assert_eq!(payment.text("CreditInvoiceNumber"), Some("123"));

    let shipments: Vec<_> = payment.objects("PaymentShipments").collect();
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0].text("OrderId"), Some("123001"));
    assert_eq!(shipments[0].text("ShipmentId"), Some("456"));
    assert_eq!(shipments[0].decimal("PaymentShipmentAmount"), Some(Decimal::new(42577, 2)));
    assert_eq!(shipments[0].text("PaymentStatus"), Some("FINAL"));
}

#[tokio::test]
async fn test_payments_rejects_invalid_month() {
    let transport = StubTransport::new().shared();
    let api = plaza_api(&transport);

    let result = api.payments().list(2015, 13).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    assert!(transport.requests().is_empty());
}

// ============================================================================
// Shipments and transports
// ============================================================================

#[tokio::test]
async fn test_shipments_list() {
    let transport = StubTransport::new().respond(200, plaza_fixture("shipments.xml")).shared();
    let api = plaza_api(&transport);

    let shipments = api.shipments().list(1, None).await.expect("should list shipments");
    assert_eq!(shipments.len(), 2);

    let first = &shipments[0];
    let shipped = cest()
        .with_ymd_and_hms(2016, 9, 19, 18, 21, 59)
        .single()
        .expect("valid timestamp")
        + chrono::Duration::milliseconds(324);
    assert_eq!(first.datetime("ShipmentDate"), Some(&Timestamp::Zoned(shipped)));

    let expected = cest().with_ymd_and_hms(2016, 9, 19, 0, 0, 0).single().expect("valid timestamp");
    assert_eq!(first.datetime("ExpectedDeliveryDate"), Some(&Timestamp::Zoned(expected)));
    assert_eq!(
        first.datetime("ExpectedDeliveryDate").and_then(Timestamp::offset),
        Some(cest())
    );

    let transport_details = first.object("Transport").expect("transport");
    assert_eq!(transport_details.text("TransporterCode"), Some("DHLFORYOU"));
    assert_eq!(transport_details.integer("ShippingLabelId"), Some(349));

    let second = &shipments[1];
    assert!(second.text("ShipmentId").is_none());
    assert_eq!(second.objects("ShipmentItems").count(), 1);
    assert_eq!(
        second.path("ShipmentItems[0].OrderItem.OrderItemId").and_then(FieldValue::as_text),
        Some("8812523")
    );
}

#[tokio::test]
async fn test_create_shipment_body() {
    let transport =
        StubTransport::new().respond(200, plaza_fixture("create_shipment.xml")).shared();
    let api = plaza_api(&transport);

    let mut shipment = CreateShipment::new("123", naive(2016, 10, 1, 1, 8, 17));
    shipment.shipment_reference = Some("abc".to_owned());
    shipment.transporter_code = Some(TransporterCode::Gls);
    shipment.track_and_trace = Some("3S123".to_owned());

    let status = api.shipments().create(&shipment).await.expect("should create shipment");
    assert_eq!(status.seller_id, Some(12_345_678));
    assert_eq!(status.event_type, "CONFIRM_SHIPMENT");
    assert!(status.is_pending());

    let request = transport.last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.path(), "/services/rest/shipments/v2");
    assert_eq!(
        request.body_text(),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ShipmentRequest xmlns="https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd">
    <DateTime>2016-10-01T01:08:17</DateTime>
    <OrderItemId>123</OrderItemId>
    <ShipmentReference>abc</ShipmentReference>
    <Transport>
        <TrackAndTrace>3S123</TrackAndTrace>
        <TransporterCode>GLS</TransporterCode>
    </Transport>
</ShipmentRequest>
"#
    );
}

#[tokio::test]
async fn test_change_transport() {
    let transport =
        StubTransport::new().respond(200, plaza_fixture("change_transport.xml")).shared();
    let api = plaza_api(&transport);

    let change = ChangeTransport {
        transporter_code: TransporterCode::Gls,
        track_and_trace: "3S123".to_owned(),
    };
    let status = api.transports().update(1, &change).await.expect("should update transport");
    assert_eq!(status.seller_id, Some(925_853));
    assert_eq!(status.entity_id.as_deref(), Some("1"));

    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url.path(), "/services/rest/transports/v2/1");
    assert_eq!(
        request.body_text(),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ChangeTransportRequest xmlns="https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd">
    <TrackAndTrace>3S123</TrackAndTrace>
    <TransporterCode>GLS</TransporterCode>
</ChangeTransportRequest>
"#
    );
}

#[tokio::test]
async fn test_cancel_order_item_rejects_path_injection() {
    let transport = StubTransport::new().shared();
    let api = plaza_api(&transport);

    let result =
        api.order_items().cancel("../orders", naive(2016, 10, 1, 0, 0, 0), "OUT_OF_STOCK").await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    assert!(transport.requests().is_empty());
}

// ============================================================================
// Fulfilment by bol.com
// ============================================================================

#[tokio::test]
async fn test_inventory() {
    let transport = StubTransport::new().respond(200, plaza_fixture("inventory.xml")).shared();
    let api = plaza_api(&transport);

    let query = InventoryQuery {
        page: Some(1),
        quantity: Some("0-250".to_owned()),
        state: Some("saleable".to_owned()),
        query: Some("0042491966861".to_owned()),
        ..InventoryQuery::default()
    };
    let inventory = api.inventory().get(&query).await.expect("should fetch inventory");

    let request = transport.last_request();
    assert_eq!(request.url.path(), "/services/rest/inventory");
    assert_eq!(request.query_value("quantity"), Some("0-250"));
    assert_eq!(request.query_value("state"), Some("saleable"));

    assert_eq!(inventory.integer("TotalCount"), Some(144));
    let offers: Vec<_> = inventory.objects("Offers").collect();
    assert_eq!(offers.len(), 5);
    assert_eq!(offers[0].text("EAN"), Some("9789076174143"));
    assert_eq!(offers[0].text("NCK-Stock"), Some("1"));
    assert_eq!(offers[1].text("Title"), Some("Harry Potter & de Vuurbeker"));
}

#[tokio::test]
async fn test_single_inbound() {
    let transport = StubTransport::new().respond(200, plaza_fixture("inbound.xml")).shared();
    let api = plaza_api(&transport);

    let inbound = api.inbounds().get(1_124_284_930).await.expect("should fetch inbound");
    assert_eq!(transport.last_request().url.path(), "/services/rest/inbounds/1124284930");

    assert_eq!(inbound.text("Id"), Some("1124284930"));
    assert_eq!(inbound.boolean("LabellingService"), Some(false));
    assert_eq!(inbound.integer("AnnouncedQuantity"), Some(237));
    assert_eq!(inbound.objects("Products").count(), 4);
    assert_eq!(
        inbound.path("Products[0].AnnouncedQuantity").and_then(FieldValue::as_integer),
        Some(6)
    );
    assert_eq!(
        inbound.path("StateTransitions[0].State").and_then(FieldValue::as_text),
        Some("ArrivedAtWH")
    );
    assert_eq!(
        inbound.path("FbbTransporter.Name").and_then(FieldValue::as_text),
        Some("PostNL")
    );
    assert_eq!(
        inbound.path("FbbTransporter.Code").and_then(FieldValue::as_text),
        Some("PostNL")
    );
}

#[tokio::test]
async fn test_all_inbounds() {
    let transport = StubTransport::new().respond(200, plaza_fixture("inbounds.xml")).shared();
    let api = plaza_api(&transport);

    let inbounds = api.inbounds().list(1).await.expect("should list inbounds");
    assert_eq!(inbounds.integer("TotalCount"), Some(4));

    let all: Vec<_> = inbounds.objects("AllInbound").collect();
    assert_eq!(all.len(), 2);

    let inbound = all[0];
    assert_eq!(inbound.text("Id"), Some("1124284930"));
    assert_eq!(inbound.text("State"), Some("ArrivedAtWH"));
    assert_eq!(inbound.boolean("LabellingService"), Some(false));
    assert_eq!(inbound.integer("AnnouncedBSKUs"), Some(69));
    assert_eq!(inbound.integer("AnnouncedQuantity"), Some(237));
    assert_eq!(inbound.integer("ReceivedBSKUs"), Some(69));
    assert_eq!(inbound.integer("ReceivedQuantity"), Some(240));
    assert!(inbound.objects("Products").next().is_none());
}

#[tokio::test]
async fn test_delivery_window() {
    let transport =
        StubTransport::new().respond(200, plaza_fixture("delivery_window.xml")).shared();
    let api = plaza_api(&transport);

    let date = NaiveDate::from_ymd_opt(2017, 1, 30).expect("valid date");
    let slots = api.inbounds().delivery_window(date, 20).await.expect("should fetch window");

    let request = transport.last_request();
    assert_eq!(request.url.path(), "/services/rest/inbounds/delivery-windows");
    assert_eq!(request.query_value("delivery-date"), Some("30-01-2017"));
    assert_eq!(request.query_value("items-to-send"), Some("20"));

    assert_eq!(slots.len(), 10);
    let start = cest().with_ymd_and_hms(2017, 8, 16, 7, 0, 0).single().expect("valid timestamp");
    assert_eq!(slots[0].datetime("Start"), Some(&Timestamp::Zoned(start)));
    let end = cest().with_ymd_and_hms(2017, 8, 16, 17, 0, 0).single().expect("valid timestamp");
    assert_eq!(slots[9].datetime("End"), Some(&Timestamp::Zoned(end)));
}

// ============================================================================
// Returns
// ============================================================================

#[tokio::test]
async fn test_unhandled_return_items() {
    let transport = StubTransport::new().respond(200, plaza_fixture("return_items.xml")).shared();
    let api = plaza_api(&transport);

    let items = api.return_items().unhandled().await.expect("should list returns");
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.integer("ReturnNumber"), Some(31_234_567));
    assert_eq!(item.integer("OrderId"), Some(4_123_456_789));
    assert_eq!(item.integer("ShipmentId"), Some(0));
    assert_eq!(item.text("EAN"), Some("9781781103524"));

    let customer = item.object("CustomerDetails").expect("customer details");
    assert_eq!(customer.text("FirstName"), Some("Jane"));
    assert_eq!(customer.text("Surname"), Some("Doe"));
    assert_eq!(customer.text("ZipCode"), Some("1234 AA"));
    assert_eq!(
        customer.get("SalutationCode"),
        Some(&FieldValue::Enum { code: "02".to_owned(), label: "FEMALE" })
    );
}

#[tokio::test]
async fn test_handle_return_item() {
    let transport = StubTransport::new().respond(200, plaza_fixture("handle_return.xml")).shared();
    let api = plaza_api(&transport);

    let status = api
        .return_items()
        .handle(65_380_525, "FAILS_TO_MATCH_RETURN_CONDITIONS", 2)
        .await
        .expect("should handle return");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.url.path(), "/services/rest/return-items/v2/65380525/handle");
    assert!(request.body_text().contains("<StatusReason>FAILS_TO_MATCH_RETURN_CONDITIONS</StatusReason>"));
    assert!(request.body_text().contains("<QuantityReturned>2</QuantityReturned>"));

    assert_eq!(status.id, 112_748_417);
    assert_eq!(status.seller_id, Some(999_849));
    assert_eq!(status.entity_id.as_deref(), Some("65380525"));
    assert_eq!(status.event_type, "HANDLE_RETURN_ITEM");
    assert_eq!(status.status, "PENDING");
    assert_eq!(status.links.len(), 1);
    assert_eq!(status.links[0].rel, "self");
    assert_eq!(status.links[0].method.as_deref(), Some("GET"));
}

#[tokio::test]
async fn test_process_status_lookup() {
    let body = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ProcessStatus xmlns="https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd">
    <id>112748417</id>
    <sellerId>999849</sellerId>
    <entityId>65380525</entityId>
    <eventType>HANDLE_RETURN_ITEM</eventType>
    <description>Handle the return item with returnNumber 65380525</description>
    <status>FAILURE</status>
    <errorMessage>Return item 65380525 has already been handled.</errorMessage>
    <createTimestamp>2019-02-19T09:08:36.629+01:00</createTimestamp>
</ProcessStatus>"#;
    let transport = StubTransport::new().respond(200, body).shared();
    let api = plaza_api(&transport);

    let status = api.process_status().get(112_748_417).await.expect("should fetch status");

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.path(), "/services/rest/process-status/v2/112748417");
    assert!(request.header("X-BOL-Authorization").is_some());

    assert_eq!(status.status, "FAILURE");
    assert!(!status.is_pending());
    assert_eq!(
        status.error_message.as_deref(),
        Some("Return item 65380525 has already been handled.")
    );
    assert!(status.links.is_empty());

    let cet = FixedOffset::east_opt(3600).expect("valid offset");
    assert_eq!(status.create_timestamp.and_then(|t| t.offset()), Some(cet));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_error_response_becomes_marketplace_error() {
    let body = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ErrorResponse xmlns="https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd">
    <ErrorCode>41300</ErrorCode>
    <ErrorMessage>Order item id 123 is not valid.</ErrorMessage>
</ErrorResponse>"#;
    let transport = StubTransport::new().respond(400, body).shared();
    let api = plaza_api(&transport);

    let error = api.orders().list(1, None).await.expect_err("should fail");
    assert_eq!(error.status(), Some(400));
    let ApiError::Marketplace(error) = error else {
        panic!("expected marketplace error, got {error:?}");
    };
    assert_eq!(error.code.as_deref(), Some("41300"));
    assert_eq!(error.description, "Order item id 123 is not valid.");
}

#[tokio::test]
async fn test_malformed_body_is_a_document_error() {
    let transport = StubTransport::new().respond(200, "<Orders><Order>").shared();
    let api = plaza_api(&transport);

    let result = api.orders().list(1, None).await;
    assert!(matches!(result, Err(ApiError::Document { .. })));
}
