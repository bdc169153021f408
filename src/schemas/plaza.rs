//! Plaza (XML) entity schemas and request bodies.
//!
//! Element names are kept exactly as the Plaza API spells them, so mapped attributes read
//! `OrderId`, `CustomerDetails`, `NCK-Stock` and so on.

use crate::mapping::{
    Coercion, FieldDescriptor as F, RequestField as R, RequestSchema, Schema, coerce::CodeTable,
};

/// Namespace declared on every Plaza v2 request body.
pub const NAMESPACE: &str = "https://plazaapi.bol.com/services/xsd/v2/plazaapi.xsd";

/// Salutation codes used by return item customer details.
pub const SALUTATION_CODES: CodeTable = &[("01", "MALE"), ("02", "FEMALE"), ("03", "UNKNOWN")];

// Orders

/// Shipment or billing address of an order.
pub static ADDRESS_DETAILS: Schema = Schema::new(
    "AddressDetails",
    &[
        F::integer("SalutationCode"),
        F::text("Firstname"),
        F::text("Surname"),
        F::text("Streetname"),
        F::integer("Housenumber").best_effort(),
        F::text("HousenumberExtended"),
        F::text("AddressSupplement"),
        F::text("ExtraAddressInformation"),
        F::text("ZipCode"),
        F::text("City"),
        F::text("CountryCode"),
        F::text("Email"),
        F::text("DeliveryPhoneNumber"),
        F::text("Company"),
        F::text("VatNumber"),
    ],
);

/// Customer block of an order.
pub static CUSTOMER_DETAILS: Schema = Schema::new(
    "CustomerDetails",
    &[
        F::object("ShipmentDetails", &ADDRESS_DETAILS),
        F::object("BillingDetails", &ADDRESS_DETAILS),
    ],
);

/// One line of an order.
pub static ORDER_ITEM: Schema = Schema::new(
    "OrderItem",
    &[
        F::text("OrderItemId").required(),
        F::text("EAN"),
        F::text("OfferReference"),
        F::text("Title"),
        F::integer("Quantity"),
        F::decimal("OfferPrice"),
        F::text("PromisedDeliveryDate"),
        F::decimal("TransactionFee"),
        F::boolean("CancelRequest"),
    ],
);

/// An open order.
pub static ORDER: Schema = Schema::new(
    "Order",
    &[
        F::text("OrderId").required(),
        F::datetime("DateTimeCustomer"),
        F::datetime("DateTimeDropShipper"),
        F::object("CustomerDetails", &CUSTOMER_DETAILS),
        F::list("OrderItems", &ORDER_ITEM).wrapped("OrderItem"),
    ],
);

/// `GET /services/rest/orders/v2` response.
pub static ORDERS: Schema = Schema::new("Orders", &[F::list("Order", &ORDER)]);

// Payments

/// One item settled within a payment shipment.
pub static PAYMENT_SHIPMENT_ITEM: Schema = Schema::new(
    "PaymentShipmentItem",
    &[
        F::text("OrderItemId"),
        F::text("EAN"),
        F::text("OfferReference"),
        F::integer("Quantity"),
        F::decimal("OfferPrice"),
        F::decimal("ShippingContribution"),
        F::decimal("TransactionFee"),
        F::decimal("TotalAmount"),
        F::text("ShipmentStatus"),
    ],
);

/// One shipment settled within a payment.
pub static PAYMENT_SHIPMENT: Schema = Schema::new(
    "PaymentShipment",
    &[
        F::text("ShipmentId"),
        F::text("OrderId"),
        F::decimal("PaymentShipmentAmount"),
        F::text("PaymentStatus"),
        F::datetime("ShipmentDate"),
        F::list("PaymentShipmentItems", &PAYMENT_SHIPMENT_ITEM).wrapped("PaymentShipmentItem"),
    ],
);

/// A payout to the seller.
pub static PAYMENT: Schema = Schema::new(
    "Payment",
    &[
        F::text("CreditInvoiceNumber"),
        F::datetime("DateTimePayment"),
        F::decimal("PaymentAmount"),
        F::list("PaymentShipments", &PAYMENT_SHIPMENT).wrapped("PaymentShipment"),
    ],
);

/// `GET /services/rest/payments/v2/{YYYYMM}` response.
pub static PAYMENTS: Schema = Schema::new("Payments", &[F::list("Payment", &PAYMENT)]);

// Shipments

/// Order line inside a shipment item.
pub static SHIPMENT_ORDER_ITEM: Schema = Schema::new(
    "OrderItem",
    &[
        F::text("OrderItemId"),
        F::text("OrderId"),
        F::integer("OrderItemSequenceNumber"),
        F::datetime("OrderDate"),
        F::date("PromisedDeliveryDate"),
        F::text("EAN"),
        F::text("Title"),
        F::integer("Quantity"),
        F::decimal("OfferPrice"),
        F::text("OfferCondition"),
        F::text("OfferReference"),
        F::text("FulfilmentMethod"),
    ],
);

/// One shipped item.
pub static SHIPMENT_ITEM: Schema =
    Schema::new("ShipmentItem", &[F::object("OrderItem", &SHIPMENT_ORDER_ITEM)]);

/// Carrier details of a shipment.
pub static TRANSPORT: Schema = Schema::new(
    "Transport",
    &[
        F::text("TransportId"),
        F::text("TransporterCode"),
        F::text("TrackAndTrace"),
        F::integer("ShippingLabelId"),
        F::text("ShippingLabelCode"),
    ],
);

/// Recipient of a shipment.
pub static SHIPMENT_CUSTOMER_DETAILS: Schema = Schema::new(
    "CustomerDetails",
    &[
        F::integer("SalutationCode"),
        F::text("FirstName"),
        F::text("Surname"),
        F::text("Streetname"),
        F::integer("Housenumber").best_effort(),
        F::text("HousenumberExtended"),
        F::text("AddressSupplement"),
        F::text("ExtraAddressInformation"),
        F::text("ZipCode"),
        F::text("City"),
        F::text("CountryCode"),
        F::text("Email"),
        F::text("DeliveryPhoneNumber"),
        F::text("Company"),
        F::text("VatNumber"),
    ],
);

/// A confirmed shipment.
pub static SHIPMENT: Schema = Schema::new(
    "Shipment",
    &[
        F::text("ShipmentId"),
        F::datetime("ShipmentDate"),
        F::datetime("ExpectedDeliveryDate"),
        F::text("ShipmentReference"),
        F::list("ShipmentItems", &SHIPMENT_ITEM).wrapped("ShipmentItem"),
        F::object("Transport", &TRANSPORT),
        F::object("CustomerDetails", &SHIPMENT_CUSTOMER_DETAILS),
    ],
);

/// `GET /services/rest/shipments/v2` response.
pub static SHIPMENTS: Schema = Schema::new("Shipments", &[F::list("Shipment", &SHIPMENT)]);

// Process status

/// Hyperlink attached to a process status. Values come from XML attributes.
pub static PROCESS_LINK: Schema =
    Schema::new("link", &[F::text("rel"), F::text("href"), F::text("method")]);

/// Acknowledgment of an asynchronous operation.
pub static PROCESS_STATUS: Schema = Schema::new(
    "ProcessStatus",
    &[
        F::integer("id").required(),
        F::integer("sellerId"),
        F::text("entityId"),
        F::text("eventType").required(),
        F::text("description"),
        F::text("status").required(),
        F::text("errorMessage"),
        F::datetime("createTimestamp"),
        F::list("Links", &PROCESS_LINK).wrapped("link"),
    ],
);

// Inventory

/// Stock level of one FBB offer.
pub static INVENTORY_OFFER: Schema = Schema::new(
    "Offer",
    &[
        F::text("EAN"),
        F::text("BSKU"),
        F::text("Title"),
        F::text("Stock"),
        F::text("NCK-Stock"),
    ],
);

/// `GET /services/rest/inventory` response.
pub static INVENTORY: Schema = Schema::new(
    "InventoryResponse",
    &[
        F::integer("TotalCount"),
        F::integer("TotalPageCount"),
        F::list("Offers", &INVENTORY_OFFER).wrapped("Offer"),
    ],
);

// Inbounds

/// Start and end of a delivery slot.
pub static TIME_SLOT: Schema =
    Schema::new("TimeSlot", &[F::datetime("Start"), F::datetime("End")]);

/// Carrier delivering an inbound shipment.
pub static FBB_TRANSPORTER: Schema =
    Schema::new("FbbTransporter", &[F::text("Name"), F::text("Code")]);

/// Product announced in an inbound shipment.
pub static INBOUND_PRODUCT: Schema = Schema::new(
    "Product",
    &[
        F::text("EAN"),
        F::text("BSKU"),
        F::integer("AnnouncedQuantity"),
        F::integer("ReceivedQuantity"),
        F::text("State"),
    ],
);

/// One state change of an inbound shipment.
pub static INBOUND_STATE: Schema =
    Schema::new("InboundState", &[F::text("State"), F::datetime("StateDate")]);

/// An inbound shipment to a fulfilment warehouse.
pub static INBOUND: Schema = Schema::new(
    "Inbound",
    &[
        F::text("Id").required(),
        F::text("Reference"),
        F::datetime("CreationDate"),
        F::text("State"),
        F::boolean("LabellingService"),
        F::integer("AnnouncedBSKUs"),
        F::integer("AnnouncedQuantity"),
        F::integer("ReceivedBSKUs"),
        F::integer("ReceivedQuantity"),
        F::list("Products", &INBOUND_PRODUCT).wrapped("Product"),
        F::list("StateTransitions", &INBOUND_STATE).wrapped("InboundState"),
        F::object("TimeSlot", &TIME_SLOT),
        F::object("FbbTransporter", &FBB_TRANSPORTER),
    ],
);

/// `GET /services/rest/inbounds` response. The repeated `Inbound` elements are exposed as
/// `AllInbound`.
pub static INBOUNDS: Schema = Schema::new(
    "Inbounds",
    &[
        F::integer("TotalCount"),
        F::integer("TotalPageCount"),
        F::list("AllInbound", &INBOUND).from_key("Inbound"),
    ],
);

/// `GET /services/rest/inbounds/delivery-windows` response.
pub static DELIVERY_WINDOW: Schema =
    Schema::new("DeliveryWindow", &[F::list("TimeSlot", &TIME_SLOT)]);

// Return items

/// Customer who returned an item.
pub static RETURN_CUSTOMER_DETAILS: Schema = Schema::new(
    "CustomerDetails",
    &[
        F::scalar("SalutationCode", Coercion::Enum(SALUTATION_CODES)),
        F::text("FirstName"),
        F::text("Surname"),
        F::text("Streetname"),
        F::integer("Housenumber").best_effort(),
        F::text("HousenumberExtended"),
        F::text("ZipCode"),
        F::text("City"),
        F::text("CountryCode"),
        F::text("Email"),
        F::text("DeliveryPhoneNumber"),
        F::text("Company"),
    ],
);

/// A returned item awaiting handling.
pub static RETURN_ITEM: Schema = Schema::new(
    "Item",
    &[
        F::integer("ReturnNumber").required(),
        F::integer("OrderId"),
        F::integer("ShipmentId"),
        F::text("EAN"),
        F::text("Title"),
        F::integer("Quantity"),
        F::datetime("ReturnDateAnnouncement"),
        F::text("ReturnReason"),
        F::object("CustomerDetails", &RETURN_CUSTOMER_DETAILS),
    ],
);

/// `GET /services/rest/return-items/v2/unhandled` response.
pub static RETURN_ITEMS: Schema = Schema::new("ReturnItems", &[F::list("Item", &RETURN_ITEM)]);

/// Body of a non-2xx Plaza response.
pub static ERROR_RESPONSE: Schema = Schema::new(
    "ErrorResponse",
    &[F::text("ErrorCode"), F::text("ErrorMessage"), F::text("Message")],
);

// Request bodies

/// `POST /services/rest/shipments/v2`.
pub static CREATE_SHIPMENT_REQUEST: RequestSchema = RequestSchema::new(
    "ShipmentRequest",
    Some(NAMESPACE),
    &[
        R::value("date_time", "DateTime", Coercion::DateTime).required(),
        R::value("expected_delivery_date", "ExpectedDeliveryDate", Coercion::DateTime),
        R::value("order_item_id", "OrderItemId", Coercion::Text).required(),
        R::value("shipment_reference", "ShipmentReference", Coercion::Text),
        R::value("shipping_label_id", "ShippingLabelId", Coercion::Integer),
        R::group(
            "Transport",
            &[
                R::value("track_and_trace", "TrackAndTrace", Coercion::Text),
                R::value("transporter_code", "TransporterCode", Coercion::Text),
            ],
        ),
    ],
);

/// `PUT /services/rest/transports/v2/{id}`.
pub static CHANGE_TRANSPORT_REQUEST: RequestSchema = RequestSchema::new(
    "ChangeTransportRequest",
    Some(NAMESPACE),
    &[
        R::value("track_and_trace", "TrackAndTrace", Coercion::Text).required(),
        R::value("transporter_code", "TransporterCode", Coercion::Text).required(),
    ],
);

/// `PUT /services/rest/order-items/v2/{id}/cancellation`.
pub static CANCELLATION_REQUEST: RequestSchema = RequestSchema::new(
    "Cancellation",
    Some(NAMESPACE),
    &[
        R::value("date_time", "DateTime", Coercion::DateTime).required(),
        R::value("reason_code", "ReasonCode", Coercion::Text).required(),
    ],
);

/// `PUT /services/rest/return-items/v2/{return_number}/handle`.
pub static RETURN_ITEM_STATUS_UPDATE: RequestSchema = RequestSchema::new(
    "ReturnItemStatusUpdate",
    Some(NAMESPACE),
    &[
        R::value("quantity_returned", "QuantityReturned", Coercion::Integer).required(),
        R::value("status_reason", "StatusReason", Coercion::Text).required(),
    ],
);
