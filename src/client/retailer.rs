//! Retailer API client (JSON).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bol_api::{
//!     auth::{ClientCredentials, TokenCache},
//!     client::RetailerApi,
//!     transport::HttpTransport,
//! };
//!
//! # async fn example() -> bol_api::Result<()> {
//! let transport = Arc::new(HttpTransport::new()?);
//! let tokens = TokenCache::new(ClientCredentials::new(Arc::clone(&transport), "id", "secret"));
//! let api = RetailerApi::new(transport, tokens);
//!
//! let order = api.orders().get("2K8290LP8").await?;
//! println!("{:?}", order.text("orderPlacedDateTime"));
//! # Ok(())
//! # }
//! ```

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::{Generation, ProcessStatus, TransporterCode, endpoint, path_segment};
use crate::{
    auth::{AccessToken, TokenSource},
    error::Result,
    mapping::{MappedObject, Payload, RequestSchema, Schema},
    schemas::retailer,
    transport::{ApiRequest, Method, Transport, TransportResponse},
};

/// Production base URL.
pub const RETAILER_URL: &str = "https://api.bol.com/retailer";

/// Demo environment base URL.
pub const RETAILER_DEMO_URL: &str = "https://api.bol.com/retailer-demo";

/// Media type of every Retailer request and response.
pub const RETAILER_MEDIA_TYPE: &str = "application/vnd.retailer.v3+json";

/// Client for the Retailer API.
///
/// A 401 answer drops the cached token and the call is repeated once with a fresh one.
#[derive(Debug, Clone)]
pub struct RetailerApi<T, S> {
    transport: T,
    tokens: S,
    base_url: String,
}

impl<T: Transport, S: TokenSource> RetailerApi<T, S> {
    /// Creates a client against the production environment.
    #[must_use]
    pub fn new(transport: T, tokens: S) -> Self {
        Self { transport, tokens, base_url: RETAILER_URL.to_owned() }
    }

    /// Switches between the demo and the production environment.
    #[must_use]
    pub fn with_demo_environment(mut self, demo: bool) -> Self {
        self.base_url = if demo { RETAILER_DEMO_URL } else { RETAILER_URL }.to_owned();
        self
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token source.
    pub const fn tokens(&self) -> &S {
        &self.tokens
    }

    /// Orders and order items.
    pub const fn orders(&self) -> Orders<'_, T, S> {
        Orders { api: self }
    }

    /// Shipments.
    pub const fn shipments(&self) -> Shipments<'_, T, S> {
        Shipments { api: self }
    }

    /// Process status polling.
    pub const fn process_status(&self) -> ProcessStatuses<'_, T, S> {
        ProcessStatuses { api: self }
    }

    /// Offer management.
    pub const fn offers(&self) -> Offers<'_, T, S> {
        Offers { api: self }
    }

    /// Customer returns.
    pub const fn returns(&self) -> Returns<'_, T, S> {
        Returns { api: self }
    }

    /// Sends one authorized request and returns the response with the token it carried.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&[u8]>,
    ) -> Result<(TransportResponse, AccessToken)> {
        let url = endpoint(&self.base_url, path)?;
        let token = self.tokens.fetch_token().await?;

        let mut request = ApiRequest::new(method, url)
            .with_header("Accept", RETAILER_MEDIA_TYPE)
            .with_header("Content-Type", RETAILER_MEDIA_TYPE)
            .with_header("Authorization", token.authorization());
        for (name, value) in query {
            request = request.with_query(name, value.clone());
        }
        if let Some(body) = body {
            request = request.with_body(body.to_vec());
        }

        let response = self.transport.send(request).await?;
        Ok((response, token))
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
        schema: &'static Schema,
    ) -> Result<MappedObject> {
        let (mut response, token) = self.send(method, path, query, body.as_deref()).await?;
        if response.status == 401 {
            debug!("token rejected, retrying with a fresh one");
            self.tokens.invalidate(&token).await;
            (response, _) = self.send(method, path, query, body.as_deref()).await?;
        }
        Generation::Retailer.read(schema, &response)
    }

    async fn get(&self, path: &str, query: &[(&str, String)], schema: &'static Schema) -> Result<MappedObject> {
        self.call(Method::Get, path, query, None, schema).await
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        request: Option<(&RequestSchema, &Payload)>,
    ) -> Result<ProcessStatus> {
        let body = match request {
            Some((schema, payload)) => Some(schema.to_json(payload)?.to_string().into_bytes()),
            None => None,
        };
        self.call(method, path, &[], body, &retailer::PROCESS_STATUS).await?.to_record()
    }
}

fn page_query(page: u32, fulfilment_method: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", page.to_string())];
    if let Some(method) = fulfilment_method {
        query.push(("fulfilment-method", method.to_owned()));
    }
    query
}

/// Shipment details for one order item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipOrderItem {
    /// Seller's own reference.
    pub shipment_reference: Option<String>,
    /// Label bought through the marketplace; replaces the transport details.
    pub shipping_label_code: Option<String>,
    /// Carrier.
    pub transporter_code: Option<TransporterCode>,
    /// Carrier tracking code.
    pub track_and_trace: Option<String>,
}

impl ShipOrderItem {
    fn payload(&self) -> Payload {
        Payload::new()
            .set_opt("shipment_reference", self.shipment_reference.clone())
            .set_opt("shipping_label_code", self.shipping_label_code.clone())
            .set_opt("transporter_code", self.transporter_code)
            .set_opt("track_and_trace", self.track_and_trace.clone())
    }
}

/// `/orders`.
#[derive(Debug)]
pub struct Orders<'a, T, S> {
    api: &'a RetailerApi<T, S>,
}

impl<T: Transport, S: TokenSource> Orders<'_, T, S> {
    /// Lists open orders.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, fulfilment_method: Option<&str>) -> Result<Vec<MappedObject>> {
        let query = page_query(page, fulfilment_method);
        let mut orders = self.api.get("/orders", &query, &retailer::ORDERS).await?;
        Ok(orders.take_objects("orders"))
    }

    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`](crate::ApiError::InvalidInput) for an unusable id,
    /// otherwise the error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, order_id: &str) -> Result<MappedObject> {
        let id = path_segment("order id", order_id)?;
        self.api.get(&format!("/orders/{id}"), &[], &retailer::ORDER).await
    }

    /// Confirms the shipment of an order item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`](crate::ApiError::InvalidInput) for an unusable id,
    /// otherwise the error of the call.
    #[instrument(skip(self, shipment))]
    pub async fn ship_order_item(&self, order_item_id: &str, shipment: &ShipOrderItem) -> Result<ProcessStatus> {
        let id = path_segment("order item id", order_item_id)?;
        let payload = shipment.payload();
        self.api
            .write(Method::Put, &format!("/orders/{id}/shipment"), Some((&retailer::SHIP_ORDER_ITEM_REQUEST, &payload)))
            .await
    }

    /// Cancels an order item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`](crate::ApiError::InvalidInput) for an unusable id,
    /// otherwise the error of the call.
    #[instrument(skip(self))]
    pub async fn cancel_order_item(&self, order_item_id: &str, reason_code: &str) -> Result<ProcessStatus> {
        let id = path_segment("order item id", order_item_id)?;
        let payload = Payload::new().set("reason_code", reason_code);
        self.api
            .write(Method::Put, &format!("/orders/{id}/cancellation"), Some((&retailer::CANCELLATION_REQUEST, &payload)))
            .await
    }
}

/// `/shipments`.
#[derive(Debug)]
pub struct Shipments<'a, T, S> {
    api: &'a RetailerApi<T, S>,
}

impl<T: Transport, S: TokenSource> Shipments<'_, T, S> {
    /// Lists shipments.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u32,
        fulfilment_method: Option<&str>,
        order_id: Option<&str>,
    ) -> Result<Vec<MappedObject>> {
        let mut query = page_query(page, fulfilment_method);
        if let Some(order_id) = order_id {
            query.push(("order-id", order_id.to_owned()));
        }
        let mut shipments = self.api.get("/shipments", &query, &retailer::SHIPMENTS).await?;
        Ok(shipments.take_objects("shipments"))
    }

    /// Fetches one shipment.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, shipment_id: &str) -> Result<MappedObject> {
        let id = path_segment("shipment id", shipment_id)?;
        self.api.get(&format!("/shipments/{id}"), &[], &retailer::SHIPMENT).await
    }
}

/// `/process-status`.
#[derive(Debug)]
pub struct ProcessStatuses<'a, T, S> {
    api: &'a RetailerApi<T, S>,
}

impl<T: Transport, S: TokenSource> ProcessStatuses<'_, T, S> {
    /// Fetches the current state of a process.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, process_id: u64) -> Result<ProcessStatus> {
        self.api
            .get(&format!("/process-status/{process_id}"), &[], &retailer::PROCESS_STATUS)
            .await?
            .to_record()
    }
}

/// A new offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    /// Product EAN.
    pub ean: String,
    /// `NEW`, `AS_NEW`, `GOOD`, `REASONABLE` or `MODERATE`.
    pub condition: String,
    /// Condition category for second-hand offers.
    pub condition_category: Option<String>,
    /// Free-text condition remark.
    pub condition_comment: Option<String>,
    /// Seller's own reference.
    pub reference: Option<String>,
    /// Keep the offer offline.
    pub on_hold_by_retailer: Option<bool>,
    /// Title for products unknown to the marketplace.
    pub unknown_product_title: Option<String>,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Units in stock.
    pub stock_amount: u32,
    /// Whether the seller manages stock (as opposed to the marketplace).
    pub managed_by_retailer: Option<bool>,
    /// `FBR` or `FBB`.
    pub fulfilment_type: Option<String>,
    /// Delivery promise code, e.g. `24uurs-23`.
    pub delivery_code: Option<String>,
}

impl NewOffer {
    /// An offer for `ean` in `condition` with a price and stock level and nothing else set.
    #[must_use]
    pub fn new(ean: impl Into<String>, condition: impl Into<String>, unit_price: Decimal, stock_amount: u32) -> Self {
        Self {
            ean: ean.into(),
            condition: condition.into(),
            condition_category: None,
            condition_comment: None,
            reference: None,
            on_hold_by_retailer: None,
            unknown_product_title: None,
            unit_price,
            stock_amount,
            managed_by_retailer: None,
            fulfilment_type: None,
            delivery_code: None,
        }
    }

    fn payload(&self) -> Payload {
        Payload::new()
            .set("ean", self.ean.as_str())
            .set("condition_name", self.condition.as_str())
            .set_opt("condition_category", self.condition_category.clone())
            .set_opt("condition_comment", self.condition_comment.clone())
            .set_opt("reference", self.reference.clone())
            .set_opt("on_hold_by_retailer", self.on_hold_by_retailer)
            .set_opt("unknown_product_title", self.unknown_product_title.clone())
            .set("unit_price", self.unit_price)
            .set("stock_amount", self.stock_amount)
            .set_opt("managed_by_retailer", self.managed_by_retailer)
            .set_opt("fulfilment_type", self.fulfilment_type.clone())
            .set_opt("delivery_code", self.delivery_code.clone())
    }
}

/// Changes to an existing offer. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferUpdate {
    /// Seller's own reference.
    pub reference: Option<String>,
    /// Keep the offer offline.
    pub on_hold_by_retailer: Option<bool>,
    /// Title for products unknown to the marketplace.
    pub unknown_product_title: Option<String>,
    /// `FBR` or `FBB`.
    pub fulfilment_type: Option<String>,
    /// Delivery promise code.
    pub delivery_code: Option<String>,
}

impl OfferUpdate {
    fn payload(&self) -> Payload {
        Payload::new()
            .set_opt("reference", self.reference.clone())
            .set_opt("on_hold_by_retailer", self.on_hold_by_retailer)
            .set_opt("unknown_product_title", self.unknown_product_title.clone())
            .set_opt("fulfilment_type", self.fulfilment_type.clone())
            .set_opt("delivery_code", self.delivery_code.clone())
    }
}

/// `/offers`.
#[derive(Debug)]
pub struct Offers<'a, T, S> {
    api: &'a RetailerApi<T, S>,
}

impl<T: Transport, S: TokenSource> Offers<'_, T, S> {
    /// Creates an offer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`](crate::ApiError::InvalidInput) when the offer lacks
    /// a required part, otherwise the error of the call.
    #[instrument(skip(self, offer), fields(ean = %offer.ean))]
    pub async fn create(&self, offer: &NewOffer) -> Result<ProcessStatus> {
        let payload = offer.payload();
        self.api.write(Method::Post, "/offers", Some((&retailer::CREATE_OFFER_REQUEST, &payload))).await
    }

    /// Fetches one offer.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, offer_id: &str) -> Result<MappedObject> {
        let id = path_segment("offer id", offer_id)?;
        self.api.get(&format!("/offers/{id}"), &[], &retailer::OFFER).await
    }

    /// Updates an offer's reference, visibility or fulfilment.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self, update))]
    pub async fn update(&self, offer_id: &str, update: &OfferUpdate) -> Result<ProcessStatus> {
        let id = path_segment("offer id", offer_id)?;
        let payload = update.payload();
        self.api
            .write(Method::Put, &format!("/offers/{id}"), Some((&retailer::UPDATE_OFFER_REQUEST, &payload)))
            .await
    }

    /// Sets a single-unit price.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn update_price(&self, offer_id: &str, unit_price: Decimal) -> Result<ProcessStatus> {
        let id = path_segment("offer id", offer_id)?;
        let payload = Payload::new().set("unit_price", unit_price);
        self.api
            .write(Method::Put, &format!("/offers/{id}/price"), Some((&retailer::UPDATE_PRICE_REQUEST, &payload)))
            .await
    }

    /// Sets the stock level.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn update_stock(&self, offer_id: &str, amount: u32, managed_by_retailer: bool) -> Result<ProcessStatus> {
        let id = path_segment("offer id", offer_id)?;
        let payload = Payload::new().set("stock_amount", amount).set("managed_by_retailer", managed_by_retailer);
        self.api
            .write(Method::Put, &format!("/offers/{id}/stock"), Some((&retailer::UPDATE_STOCK_REQUEST, &payload)))
            .await
    }

    /// Deletes an offer.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn delete(&self, offer_id: &str) -> Result<ProcessStatus> {
        let id = path_segment("offer id", offer_id)?;
        self.api.write(Method::Delete, &format!("/offers/{id}"), None).await
    }

    /// Requests a CSV export of all offers. Poll the returned process for the export id.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn request_export(&self) -> Result<ProcessStatus> {
        self.api
            .write(Method::Post, "/offers/export", Some((&retailer::EXPORT_OFFERS_REQUEST, &Payload::new())))
            .await
    }
}

/// `/returns`.
#[derive(Debug)]
pub struct Returns<'a, T, S> {
    api: &'a RetailerApi<T, S>,
}

impl<T: Transport, S: TokenSource> Returns<'_, T, S> {
    /// Lists returns.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u32,
        handled: Option<bool>,
        fulfilment_method: Option<&str>,
    ) -> Result<Vec<MappedObject>> {
        let mut query = page_query(page, fulfilment_method);
        if let Some(handled) = handled {
            query.push(("handled", handled.to_string()));
        }
        let mut returns = self.api.get("/returns", &query, &retailer::RETURNS).await?;
        Ok(returns.take_objects("returns"))
    }

    /// Records how a return was handled.
    ///
    /// # Errors
    ///
    /// Returns the auth, transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn handle(&self, rma_id: u64, handling_result: &str, quantity_returned: u32) -> Result<ProcessStatus> {
        let payload = Payload::new()
            .set("handling_result", handling_result)
            .set("quantity_returned", quantity_returned);
        self.api
            .write(Method::Put, &format!("/returns/{rma_id}"), Some((&retailer::HANDLE_RETURN_REQUEST, &payload)))
            .await
    }
}
