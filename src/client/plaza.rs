//! Plaza API client (XML).
//!
//! ```rust,no_run
//! use bol_api::{auth::PlazaSigner, client::PlazaApi, transport::HttpTransport};
//!
//! # async fn example() -> bol_api::Result<()> {
//! let api = PlazaApi::new(HttpTransport::new()?, PlazaSigner::new("public", "private"));
//! for order in api.orders().list(1, None).await? {
//!     println!("{:?}", order.text("OrderId"));
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use tracing::instrument;

use super::{Generation, ProcessStatus, TransporterCode, endpoint, path_segment};
use crate::{
    auth::PlazaSigner,
    error::{ApiError, Result},
    mapping::{MappedObject, Payload, Schema},
    schemas::plaza,
    transport::{ApiRequest, Method, Transport},
};

/// Production base URL.
pub const PLAZA_URL: &str = "https://plazaapi.bol.com";

/// Test environment base URL.
pub const PLAZA_TEST_URL: &str = "https://test-plazaapi.bol.com";

/// Client for the Plaza API.
///
/// Resource groups are reached through facades such as [`PlazaApi::orders`]. Every request is
/// signed with the [`PlazaSigner`].
#[derive(Debug, Clone)]
pub struct PlazaApi<T> {
    transport: T,
    signer: PlazaSigner,
    base_url: String,
}

impl<T: Transport> PlazaApi<T> {
    /// Creates a client against the production environment.
    #[must_use]
    pub fn new(transport: T, signer: PlazaSigner) -> Self {
        Self { transport, signer, base_url: PLAZA_URL.to_owned() }
    }

    /// Switches between the test and the production environment.
    #[must_use]
    pub fn with_test_environment(mut self, test: bool) -> Self {
        self.base_url = if test { PLAZA_TEST_URL } else { PLAZA_URL }.to_owned();
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

    /// Order listing.
    pub const fn orders(&self) -> Orders<'_, T> {
        Orders { api: self }
    }

    /// Payment listing.
    pub const fn payments(&self) -> Payments<'_, T> {
        Payments { api: self }
    }

    /// Shipment listing and creation.
    pub const fn shipments(&self) -> Shipments<'_, T> {
        Shipments { api: self }
    }

    /// Track-and-trace updates.
    pub const fn transports(&self) -> Transports<'_, T> {
        Transports { api: self }
    }

    /// Order item cancellation.
    pub const fn order_items(&self) -> OrderItems<'_, T> {
        OrderItems { api: self }
    }

    /// Process status polling.
    pub const fn process_status(&self) -> ProcessStatuses<'_, T> {
        ProcessStatuses { api: self }
    }

    /// FBB inventory.
    pub const fn inventory(&self) -> Inventory<'_, T> {
        Inventory { api: self }
    }

    /// FBB inbound shipments.
    pub const fn inbounds(&self) -> Inbounds<'_, T> {
        Inbounds { api: self }
    }

    /// Customer returns.
    pub const fn return_items(&self) -> ReturnItems<'_, T> {
        ReturnItems { api: self }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<String>,
        schema: &'static Schema,
    ) -> Result<MappedObject> {
        let url = endpoint(&self.base_url, path)?;
        let signature = self.signer.sign(method, url.path())?;

        let mut request = ApiRequest::new(method, url);
        for (name, value) in query {
            request = request.with_query(name, value.clone());
        }
        for (name, value) in signature.headers() {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self.transport.send(request).await?;
        Generation::Plaza.read(schema, &response)
    }

    async fn get(&self, path: &str, query: &[(&str, String)], schema: &'static Schema) -> Result<MappedObject> {
        self.call(Method::Get, path, query, None, schema).await
    }

    async fn write(&self, method: Method, path: &str, body: String) -> Result<ProcessStatus> {
        self.call(method, path, &[], Some(body), &plaza::PROCESS_STATUS).await?.to_record()
    }
}

/// `/services/rest/orders/v2`.
#[derive(Debug)]
pub struct Orders<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Orders<'_, T> {
    /// Lists open orders.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, fulfilment_method: Option<&str>) -> Result<Vec<MappedObject>> {
        let mut query = vec![("page", page.to_string())];
        if let Some(method) = fulfilment_method {
            query.push(("fulfilment-method", method.to_owned()));
        }
        let mut orders = self.api.get("/services/rest/orders/v2", &query, &plaza::ORDERS).await?;
        Ok(orders.take_objects("Order"))
    }
}

/// `/services/rest/payments/v2`.
#[derive(Debug)]
pub struct Payments<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Payments<'_, T> {
    /// Lists the payments of one month.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for a month outside 1-12, otherwise the error of the
    /// call.
    #[instrument(skip(self))]
    pub async fn list(&self, year: u16, month: u8) -> Result<Vec<MappedObject>> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("month must be 1-12, got {month}")));
        }
        let path = format!("/services/rest/payments/v2/{year:04}{month:02}");
        let mut payments = self.api.get(&path, &[], &plaza::PAYMENTS).await?;
        Ok(payments.take_objects("Payment"))
    }
}

/// Shipment confirmation for one order item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShipment {
    /// Order item being shipped.
    pub order_item_id: String,
    /// Moment of shipping.
    pub date_time: NaiveDateTime,
    /// Expected delivery moment.
    pub expected_delivery_date: Option<NaiveDateTime>,
    /// Seller's own reference.
    pub shipment_reference: Option<String>,
    /// Label bought through the marketplace.
    pub shipping_label_id: Option<i64>,
    /// Carrier.
    pub transporter_code: Option<TransporterCode>,
    /// Carrier tracking code.
    pub track_and_trace: Option<String>,
}

impl CreateShipment {
    /// Confirms `order_item_id` as shipped at `date_time` with nothing else set.
    #[must_use]
    pub fn new(order_item_id: impl Into<String>, date_time: NaiveDateTime) -> Self {
        Self {
            order_item_id: order_item_id.into(),
            date_time,
            expected_delivery_date: None,
            shipment_reference: None,
            shipping_label_id: None,
            transporter_code: None,
            track_and_trace: None,
        }
    }

    fn payload(&self) -> Payload {
        Payload::new()
            .set("order_item_id", self.order_item_id.as_str())
            .set("date_time", self.date_time)
            .set_opt("expected_delivery_date", self.expected_delivery_date)
            .set_opt("shipment_reference", self.shipment_reference.clone())
            .set_opt("shipping_label_id", self.shipping_label_id)
            .set_opt("transporter_code", self.transporter_code)
            .set_opt("track_and_trace", self.track_and_trace.clone())
    }
}

/// `/services/rest/shipments/v2`.
#[derive(Debug)]
pub struct Shipments<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Shipments<'_, T> {
    /// Lists shipments, optionally for one order.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32, order_id: Option<&str>) -> Result<Vec<MappedObject>> {
        let mut query = vec![("page", page.to_string())];
        if let Some(order_id) = order_id {
            query.push(("order-id", order_id.to_owned()));
        }
        let mut shipments = self.api.get("/services/rest/shipments/v2", &query, &plaza::SHIPMENTS).await?;
        Ok(shipments.take_objects("Shipment"))
    }

    /// Confirms a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] if the body cannot be built, otherwise the error of
    /// the call.
    #[instrument(skip(self, shipment), fields(order_item_id = %shipment.order_item_id))]
    pub async fn create(&self, shipment: &CreateShipment) -> Result<ProcessStatus> {
        let body = plaza::CREATE_SHIPMENT_REQUEST.to_xml(&shipment.payload())?;
        self.api.write(Method::Post, "/services/rest/shipments/v2", body).await
    }
}

/// New track-and-trace details for an existing transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTransport {
    /// Carrier.
    pub transporter_code: TransporterCode,
    /// Carrier tracking code.
    pub track_and_trace: String,
}

/// `/services/rest/transports/v2`.
#[derive(Debug)]
pub struct Transports<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Transports<'_, T> {
    /// Replaces the carrier and tracking code of a transport.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self, change))]
    pub async fn update(&self, transport_id: u64, change: &ChangeTransport) -> Result<ProcessStatus> {
        let payload = Payload::new()
            .set("transporter_code", change.transporter_code)
            .set("track_and_trace", change.track_and_trace.as_str());
        let body = plaza::CHANGE_TRANSPORT_REQUEST.to_xml(&payload)?;
        let path = format!("/services/rest/transports/v2/{transport_id}");
        self.api.write(Method::Put, &path, body).await
    }
}

/// `/services/rest/order-items/v2`.
#[derive(Debug)]
pub struct OrderItems<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> OrderItems<'_, T> {
    /// Cancels an order item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] for an unusable id, otherwise the error of the call.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        order_item_id: &str,
        date_time: NaiveDateTime,
        reason_code: &str,
    ) -> Result<ProcessStatus> {
        let id = path_segment("order item id", order_item_id)?;
        let payload = Payload::new().set("date_time", date_time).set("reason_code", reason_code);
        let body = plaza::CANCELLATION_REQUEST.to_xml(&payload)?;
        let path = format!("/services/rest/order-items/v2/{id}/cancellation");
        self.api.write(Method::Put, &path, body).await
    }
}

/// `/services/rest/process-status/v2`.
#[derive(Debug)]
pub struct ProcessStatuses<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> ProcessStatuses<'_, T> {
    /// Fetches the current state of a process.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, process_id: u64) -> Result<ProcessStatus> {
        let path = format!("/services/rest/process-status/v2/{process_id}");
        self.api.get(&path, &[], &plaza::PROCESS_STATUS).await?.to_record()
    }
}

/// Filters for the inventory listing. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryQuery {
    /// Page number.
    pub page: Option<u32>,
    /// Stock range, e.g. `0-250`.
    pub quantity: Option<String>,
    /// `sufficient` or `insufficient`.
    pub stock: Option<String>,
    /// `saleable` or `unsaleable`.
    pub state: Option<String>,
    /// EAN, BSKU or title search.
    pub query: Option<String>,
}

impl InventoryQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        let text = [
            ("quantity", &self.quantity),
            ("stock", &self.stock),
            ("state", &self.state),
            ("query", &self.query),
        ];
        for (name, value) in text {
            if let Some(value) = value {
                params.push((name, value.clone()));
            }
        }
        params
    }
}

/// `/services/rest/inventory`.
#[derive(Debug)]
pub struct Inventory<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Inventory<'_, T> {
    /// Lists FBB stock. The result carries `TotalCount`, `TotalPageCount` and `Offers`.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, query: &InventoryQuery) -> Result<MappedObject> {
        self.api.get("/services/rest/inventory", &query.params(), &plaza::INVENTORY).await
    }
}

/// `/services/rest/inbounds`.
#[derive(Debug)]
pub struct Inbounds<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> Inbounds<'_, T> {
    /// Fetches one inbound shipment.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn get(&self, inbound_id: u64) -> Result<MappedObject> {
        let path = format!("/services/rest/inbounds/{inbound_id}");
        self.api.get(&path, &[], &plaza::INBOUND).await
    }

    /// Lists inbound shipments. The inbounds are under `AllInbound`.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u32) -> Result<MappedObject> {
        self.api.get("/services/rest/inbounds", &[("page", page.to_string())], &plaza::INBOUNDS).await
    }

    /// Lists the time slots available for delivering `items_to_send` items on `delivery_date`.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn delivery_window(
        &self,
        delivery_date: NaiveDate,
        items_to_send: u32,
    ) -> Result<Vec<MappedObject>> {
        let query = [
            ("delivery-date", delivery_date.format("%d-%m-%Y").to_string()),
            ("items-to-send", items_to_send.to_string()),
        ];
        let mut window = self
            .api
            .get("/services/rest/inbounds/delivery-windows", &query, &plaza::DELIVERY_WINDOW)
            .await?;
        Ok(window.take_objects("TimeSlot"))
    }
}

/// `/services/rest/return-items/v2`.
#[derive(Debug)]
pub struct ReturnItems<'a, T> {
    api: &'a PlazaApi<T>,
}

impl<T: Transport> ReturnItems<'_, T> {
    /// Lists returns that still need handling.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn unhandled(&self) -> Result<Vec<MappedObject>> {
        let mut items =
            self.api.get("/services/rest/return-items/v2/unhandled", &[], &plaza::RETURN_ITEMS).await?;
        Ok(items.take_objects("Item"))
    }

    /// Records how a return was handled.
    ///
    /// # Errors
    ///
    /// Returns the transport, marketplace or mapping error of the call.
    #[instrument(skip(self))]
    pub async fn handle(
        &self,
        return_number: u64,
        status_reason: &str,
        quantity_returned: u32,
    ) -> Result<ProcessStatus> {
        let payload = Payload::new()
            .set("status_reason", status_reason)
            .set("quantity_returned", quantity_returned);
        let body = plaza::RETURN_ITEM_STATUS_UPDATE.to_xml(&payload)?;
        let path = format!("/services/rest/return-items/v2/{return_number}/handle");
        self.api.write(Method::Put, &path, body).await
    }
}
