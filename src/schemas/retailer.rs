//! Retailer (JSON) entity schemas and request bodies.
//!
//! Property names follow the Retailer API's camelCase. Identifiers such as `orderId` and
//! `orderItemId` are strings on this API generation and are mapped as text.

use crate::mapping::{Coercion, FieldDescriptor as F, RequestField as R, RequestSchema, Schema};

// Orders

/// Delivery address of an order.
pub static SHIPMENT_DETAILS: Schema = Schema::new(
    "shipmentDetails",
    &[
        F::text("pickUpPointName"),
        F::text("salutation"),
        F::text("firstName"),
        F::text("surname"),
        F::text("streetName"),
        F::text("houseNumber"),
        F::text("houseNumberExtension"),
        F::text("extraAddressInformation"),
        F::text("zipCode"),
        F::text("city"),
        F::text("countryCode"),
        F::text("email"),
        F::text("company"),
        F::text("vatNumber"),
        F::text("deliveryPhoneNumber"),
        F::text("language"),
    ],
);

/// Invoice address of an order.
pub static BILLING_DETAILS: Schema = Schema::new(
    "billingDetails",
    &[
        F::text("salutation"),
        F::text("firstName"),
        F::text("surname"),
        F::text("streetName"),
        F::text("houseNumber"),
        F::text("houseNumberExtension"),
        F::text("extraAddressInformation"),
        F::text("zipCode"),
        F::text("city"),
        F::text("countryCode"),
        F::text("email"),
        F::text("company"),
        F::text("vatNumber"),
        F::text("kvkNumber"),
        F::text("orderReference"),
    ],
);

/// Fulfilment terms of an order item.
pub static FULFILMENT: Schema = Schema::new(
    "fulfilment",
    &[
        F::text("method"),
        F::text("distributionParty"),
        F::date("latestDeliveryDate"),
        F::date("exactDeliveryDate"),
        F::date("expiryDate"),
    ],
);

/// Offer an order item was sold from.
pub static ORDER_OFFER: Schema =
    Schema::new("offer", &[F::text("offerId"), F::text("reference")]);

/// Product of an order item.
pub static ORDER_PRODUCT: Schema = Schema::new("product", &[F::text("ean"), F::text("title")]);

/// Extra service bought with an order item.
pub static ADDITIONAL_SERVICE: Schema =
    Schema::new("additionalService", &[F::text("serviceType")]);

/// One line of an order. The list endpoint returns a reduced form of the same shape.
pub static ORDER_ITEM: Schema = Schema::new(
    "orderItem",
    &[
        F::text("orderItemId").required(),
        F::text("ean"),
        F::boolean("cancellationRequest"),
        F::object("fulfilment", &FULFILMENT),
        F::object("offer", &ORDER_OFFER),
        F::object("product", &ORDER_PRODUCT),
        F::integer("quantity"),
        F::decimal("unitPrice"),
        F::decimal("commission"),
        F::list("additionalServices", &ADDITIONAL_SERVICE),
    ],
);

/// An order.
pub static ORDER: Schema = Schema::new(
    "order",
    &[
        F::text("orderId").required(),
        F::boolean("pickUpPoint"),
        F::datetime("orderPlacedDateTime"),
        F::object("shipmentDetails", &SHIPMENT_DETAILS),
        F::object("billingDetails", &BILLING_DETAILS),
        F::list("orderItems", &ORDER_ITEM),
    ],
);

/// `GET /orders` response.
pub static ORDERS: Schema = Schema::new("orders", &[F::list("orders", &ORDER)]);

// Shipments

/// Order a shipment belongs to.
pub static SHIPMENT_ORDER: Schema =
    Schema::new("order", &[F::text("orderId"), F::datetime("orderPlacedDateTime")]);

/// One shipped order item.
pub static SHIPMENT_ITEM: Schema = Schema::new(
    "shipmentItem",
    &[
        F::text("orderItemId"),
        F::datetime("orderDate"),
        F::date("latestDeliveryDate"),
        F::text("ean"),
        F::text("title"),
        F::integer("quantity"),
        F::decimal("offerPrice"),
        F::text("offerCondition"),
        F::text("offerReference"),
        F::text("fulfilmentMethod"),
    ],
);

/// Carrier details of a shipment.
pub static TRANSPORT: Schema = Schema::new(
    "transport",
    &[
        F::text("transportId"),
        F::text("transporterCode"),
        F::text("trackAndTrace"),
        F::text("shippingLabelId"),
        F::text("shippingLabelCode"),
    ],
);

/// A shipment.
pub static SHIPMENT: Schema = Schema::new(
    "shipment",
    &[
        F::text("shipmentId").required(),
        F::boolean("pickUpPoint"),
        F::datetime("shipmentDate"),
        F::text("shipmentReference"),
        F::object("order", &SHIPMENT_ORDER),
        F::object("customerDetails", &SHIPMENT_DETAILS),
        F::object("billingDetails", &BILLING_DETAILS),
        F::list("shipmentItems", &SHIPMENT_ITEM),
        F::object("transport", &TRANSPORT),
    ],
);

/// `GET /shipments` response.
pub static SHIPMENTS: Schema = Schema::new("shipments", &[F::list("shipments", &SHIPMENT)]);

// Process status

/// Hyperlink attached to a process status.
pub static LINK: Schema =
    Schema::new("link", &[F::text("rel"), F::text("href"), F::text("method")]);

/// Acknowledgment of an asynchronous operation.
pub static PROCESS_STATUS: Schema = Schema::new(
    "processStatus",
    &[
        F::integer("id").required(),
        F::text("entityId"),
        F::text("eventType").required(),
        F::text("description"),
        F::text("status").required(),
        F::text("errorMessage"),
        F::datetime("createTimestamp"),
        F::list("links", &LINK),
    ],
);

// Offers

/// Condition of the offered product.
pub static CONDITION: Schema = Schema::new(
    "condition",
    &[F::text("name"), F::text("category"), F::text("comment")],
);

/// Price for a bundle quantity.
pub static BUNDLE_PRICE: Schema =
    Schema::new("bundlePrice", &[F::integer("quantity"), F::decimal("price")]);

/// Price ladder of an offer.
pub static PRICING: Schema =
    Schema::new("pricing", &[F::list("bundlePrices", &BUNDLE_PRICE)]);

/// Stock of an offer.
pub static STOCK: Schema = Schema::new(
    "stock",
    &[F::integer("amount"), F::integer("correctedStock"), F::boolean("managedByRetailer")],
);

/// Fulfilment terms of an offer.
pub static OFFER_FULFILMENT: Schema =
    Schema::new("fulfilment", &[F::text("type"), F::text("deliveryCode")]);

/// Store presentation of an offer. `visible` is passed through as-is.
pub static STORE: Schema = Schema::new(
    "store",
    &[F::text("productTitle"), F::scalar("visible", Coercion::Verbatim)],
);

/// Why an offer is not for sale.
pub static NOT_PUBLISHABLE_REASON: Schema =
    Schema::new("notPublishableReason", &[F::text("code"), F::text("description")]);

/// A product offer.
pub static OFFER: Schema = Schema::new(
    "offer",
    &[
        F::text("offerId").required(),
        F::text("ean"),
        F::text("reference"),
        F::boolean("onHoldByRetailer"),
        F::text("unknownProductTitle"),
        F::object("pricing", &PRICING),
        F::object("stock", &STOCK),
        F::object("fulfilment", &OFFER_FULFILMENT),
        F::object("store", &STORE),
        F::object("condition", &CONDITION),
        F::list("notPublishableReasons", &NOT_PUBLISHABLE_REASON),
    ],
);

// Returns

/// A customer return.
pub static RETURN_ITEM: Schema = Schema::new(
    "return",
    &[
        F::text("rmaId").required(),
        F::text("orderId"),
        F::text("ean"),
        F::integer("quantity"),
        F::datetime("registrationDateTime"),
        F::text("returnReason"),
        F::text("returnReasonComments"),
        F::text("fulfilmentMethod"),
        F::boolean("handled"),
        F::text("handlingResult"),
        F::text("processingResult"),
        F::datetime("processingDateTime"),
    ],
);

/// `GET /returns` response.
pub static RETURNS: Schema = Schema::new("returns", &[F::list("returns", &RETURN_ITEM)]);

// Auth and errors

/// OAuth2 token response from the login endpoint.
pub static TOKEN: Schema = Schema::new(
    "token",
    &[
        F::text("access_token").required(),
        F::text("token_type"),
        F::integer("expires_in"),
        F::text("scope"),
    ],
);

/// One rejected parameter of a problem response.
pub static VIOLATION: Schema = Schema::new("violation", &[F::text("name"), F::text("reason")]);

/// `application/problem+json` body of a non-2xx response.
pub static PROBLEM: Schema = Schema::new(
    "problem",
    &[
        F::text("type"),
        F::text("title"),
        F::integer("status").best_effort(),
        F::text("detail"),
        F::text("host"),
        F::text("instance"),
        F::list("violations", &VIOLATION),
    ],
);

// Request bodies

/// `PUT /orders/{order_item_id}/shipment`.
pub static SHIP_ORDER_ITEM_REQUEST: RequestSchema = RequestSchema::new(
    "ShipmentRequest",
    None,
    &[
        R::value("shipment_reference", "shipmentReference", Coercion::Text),
        R::value("shipping_label_code", "shippingLabelCode", Coercion::Text),
        R::group(
            "transport",
            &[
                R::value("transporter_code", "transporterCode", Coercion::Text),
                R::value("track_and_trace", "trackAndTrace", Coercion::Text),
            ],
        ),
    ],
);

/// `PUT /orders/{order_item_id}/cancellation`.
pub static CANCELLATION_REQUEST: RequestSchema = RequestSchema::new(
    "CancellationRequest",
    None,
    &[R::value("reason_code", "reasonCode", Coercion::Text).required()],
);

static BUNDLE_PRICES: [R; 2] = [
    R::fixed("quantity", "1", Coercion::Integer),
    R::value("unit_price", "price", Coercion::Decimal).required(),
];

static PRICING_REQUEST: [R; 1] = [R::group("bundlePrices", &BUNDLE_PRICES).repeated()];

static OFFER_FULFILMENT_REQUEST: [R; 2] = [
    R::value("fulfilment_type", "type", Coercion::Text),
    R::value("delivery_code", "deliveryCode", Coercion::Text),
];

/// `POST /offers`.
pub static CREATE_OFFER_REQUEST: RequestSchema = RequestSchema::new(
    "CreateOfferRequest",
    None,
    &[
        R::value("ean", "ean", Coercion::Text).required(),
        R::group(
            "condition",
            &[
                R::value("condition_name", "name", Coercion::Text).required(),
                R::value("condition_category", "category", Coercion::Text),
                R::value("condition_comment", "comment", Coercion::Text),
            ],
        ),
        R::value("reference", "reference", Coercion::Text),
        R::value("on_hold_by_retailer", "onHoldByRetailer", Coercion::Boolean),
        R::value("unknown_product_title", "unknownProductTitle", Coercion::Text),
        R::group("pricing", &PRICING_REQUEST),
        R::group(
            "stock",
            &[
                R::value("stock_amount", "amount", Coercion::Integer).required(),
                R::value("managed_by_retailer", "managedByRetailer", Coercion::Boolean),
            ],
        ),
        R::group("fulfilment", &OFFER_FULFILMENT_REQUEST),
    ],
);

/// `PUT /offers/{offer_id}`.
pub static UPDATE_OFFER_REQUEST: RequestSchema = RequestSchema::new(
    "UpdateOfferRequest",
    None,
    &[
        R::value("reference", "reference", Coercion::Text),
        R::value("on_hold_by_retailer", "onHoldByRetailer", Coercion::Boolean),
        R::value("unknown_product_title", "unknownProductTitle", Coercion::Text),
        R::group("fulfilment", &OFFER_FULFILMENT_REQUEST),
    ],
);

/// `PUT /offers/{offer_id}/price`.
pub static UPDATE_PRICE_REQUEST: RequestSchema =
    RequestSchema::new("UpdateOfferPriceRequest", None, &[R::group("pricing", &PRICING_REQUEST)]);

/// `PUT /offers/{offer_id}/stock`.
pub static UPDATE_STOCK_REQUEST: RequestSchema = RequestSchema::new(
    "UpdateOfferStockRequest",
    None,
    &[
        R::value("stock_amount", "amount", Coercion::Integer).required(),
        R::value("managed_by_retailer", "managedByRetailer", Coercion::Boolean).required(),
    ],
);

/// `POST /offers/export`.
pub static EXPORT_OFFERS_REQUEST: RequestSchema = RequestSchema::new(
    "CreateOfferExportRequest",
    None,
    &[R::fixed("format", "CSV", Coercion::Text)],
);

/// `PUT /returns/{rma_id}`.
pub static HANDLE_RETURN_REQUEST: RequestSchema = RequestSchema::new(
    "ReturnRequest",
    None,
    &[
        R::value("handling_result", "handlingResult", Coercion::Text).required(),
        R::value("quantity_returned", "quantityReturned", Coercion::Integer).required(),
    ],
);
