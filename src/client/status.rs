//! Typed records shared by both API generations.

use std::fmt;

use crate::{
    error::Result,
    mapping::{FieldValue, FromMapped, MappedObject, Timestamp},
};

/// Hyperlink attached to a process status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessLink {
    /// Relation, e.g. `self`.
    pub rel: String,
    /// Target URL.
    pub href: String,
    /// HTTP method to use on `href`.
    pub method: Option<String>,
}

impl FromMapped for ProcessLink {
    fn from_mapped(object: &MappedObject) -> Result<Self> {
        Ok(Self {
            rel: object.text("rel").unwrap_or_default().to_owned(),
            href: object.require_text("href")?,
            method: object.text("method").map(str::to_owned),
        })
    }
}

/// Acknowledgment of an asynchronous marketplace operation.
///
/// Write calls on both APIs answer with one of these; poll the process status endpoint with
/// [`id`](Self::id) until [`status`](Self::status) leaves `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Process id.
    pub id: i64,
    /// Seller the process belongs to. Plaza only.
    pub seller_id: Option<i64>,
    /// Id of the entity the process acts on.
    pub entity_id: Option<String>,
    /// Operation, e.g. `CONFIRM_SHIPMENT`.
    pub event_type: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// `PENDING`, `SUCCESS`, `FAILURE` or `TIMEOUT`.
    pub status: String,
    /// Failure reason.
    pub error_message: Option<String>,
    /// When the process was created.
    pub create_timestamp: Option<Timestamp>,
    /// Related links.
    pub links: Vec<ProcessLink>,
}

impl ProcessStatus {
    /// Returns `true` while the marketplace is still working on the process.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == "PENDING"
    }
}

impl FromMapped for ProcessStatus {
    fn from_mapped(object: &MappedObject) -> Result<Self> {
        // Plaza wraps links in `<Links>`, Retailer uses a `links` array.
        let links = object
            .objects("Links")
            .chain(object.objects("links"))
            .map(ProcessLink::from_mapped)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: object.require_integer("id")?,
            seller_id: object.integer("sellerId"),
            entity_id: object.text_lossy("entityId"),
            event_type: object.require_text("eventType")?,
            description: object.text("description").map(str::to_owned),
            status: object.require_text("status")?,
            error_message: object.text("errorMessage").map(str::to_owned),
            create_timestamp: object.datetime("createTimestamp").copied(),
            links,
        })
    }
}

/// Carrier codes accepted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TransporterCode {
    /// bpost (Belgium).
    Bpost,
    /// bpost letter mail.
    BpostBrief,
    /// Letter post.
    Briefpost,
    /// Generic courier.
    Courier,
    /// DHL.
    Dhl,
    /// DHL Germany.
    DhlDe,
    /// DHL For You.
    DhlForYou,
    /// DHL Global Mail.
    DhlGlobalMail,
    /// DPD Belgium.
    DpdBe,
    /// DPD Netherlands.
    DpdNl,
    /// Dynalogic.
    Dynalogic,
    /// FedEx Belgium.
    FedexBe,
    /// FedEx Netherlands.
    FedexNl,
    /// GLS.
    Gls,
    /// Kiala Belgium.
    KialaBe,
    /// Kiala Netherlands.
    KialaNl,
    /// Packs.
    Packs,
    /// Parcel.nl.
    ParcelNl,
    /// PostNL (the marketplace still calls it TNT).
    Tnt,
    /// PostNL letter mail.
    TntBrief,
    /// PostNL Express.
    TntExpress,
    /// PostNL Extra@Home.
    TntExtra,
    /// Transmission.
    Transmission,
    /// TSN.
    Tsn,
    /// UPS.
    Ups,
    /// Any other carrier.
    Other,
}

impl TransporterCode {
    /// Code as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bpost => "BPOST_BE",
            Self::BpostBrief => "BPOST_BRIEF",
            Self::Briefpost => "BRIEFPOST",
            Self::Courier => "COURIER",
            Self::Dhl => "DHL",
            Self::DhlDe => "DHL_DE",
            Self::DhlForYou => "DHLFORYOU",
            Self::DhlGlobalMail => "DHL-GLOBAL-MAIL",
            Self::DpdBe => "DPD-BE",
            Self::DpdNl => "DPD-NL",
            Self::Dynalogic => "DYL",
            Self::FedexBe => "FEDEX_BE",
            Self::FedexNl => "FEDEX_NL",
            Self::Gls => "GLS",
            Self::KialaBe => "KIALA-BE",
            Self::KialaNl => "KIALA-NL",
            Self::Packs => "PACKS",
            Self::ParcelNl => "PARCEL-NL",
            Self::Tnt => "TNT",
            Self::TntBrief => "TNT_BRIEF",
            Self::TntExpress => "TNT-EXPRESS",
            Self::TntExtra => "TNT-EXTRA",
            Self::Transmission => "TRANSMISSION",
            Self::Tsn => "TSN",
            Self::Ups => "UPS",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for TransporterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TransporterCode> for FieldValue {
    fn from(code: TransporterCode) -> Self {
        Self::Text(code.as_str().to_owned())
    }
}
