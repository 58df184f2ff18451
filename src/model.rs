use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, RecordKind};
use crate::history::Record;
use crate::sizes::SizeQuantities;

/// Declares a closed set of labels that round-trip through their display text.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(LedgerError::UnknownOption {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum! {
    /// Production workflow of an order.
    OrderStatus, "status" {
        Pending => "PENDIENTE",
        InProduction => "EN PRODUCCIÓN",
        ToPack => "POR EMPACAR",
        Delivered => "ENTREGADO",
        Cancelled => "CANCELADO",
    }
}

labelled_enum! {
    PaymentStatus, "paymentStatus" {
        ChooseOption => "ELEGIR OPCION",
        ToPay => "POR PAGAR",
        DepositPaid => "ANTICIPO",
        Owing => "ADEUDO",
        Paid => "PAGADO",
        NotApplicable => "N/A",
    }
}

labelled_enum! {
    InvoiceStatus, "invoiceStatus" {
        ChooseOption => "ELEGIR OPCION",
        NoInvoice => "SIN FACTURA",
        Pending => "SI PENDIENTE",
        Invoiced => "FACTURADO",
        WithoutIva => "SIN IVA",
        NotApplicable => "N/A",
    }
}

labelled_enum! {
    OrderType, "orderType" {
        Order => "PEDIDO",
        SampleKit => "MUESTRA KIT",
        SampleFoot => "MUESTRA PIE",
        SamplePair => "MUESTRA PAR",
        InternalSample => "MUESTRA INTERNA",
    }
}

labelled_enum! {
    ShoeModel, "model" {
        Casual => "CASUAL",
        Urban => "URBAN",
        Sandal => "SANDALIA",
    }
}

labelled_enum! {
    /// Workshop product category.
    Profile, "profile" {
        Ds => "DS",
        Cf => "CF",
        Rt => "RT",
        Internal => "INT",
    }
}

impl Profile {
    /// Profiles offered on the quote form.
    pub const QUOTE_OPTIONS: [Profile; 3] = [Profile::Ds, Profile::Cf, Profile::Rt];

    /// Parses a quote-form selection. Blank means "not selected"; `INT` is not offered.
    pub fn parse_quote_option(raw: &str) -> Result<Option<Profile>, LedgerError> {
        match parse_selection::<Profile>(raw)? {
            Some(p) if !Self::QUOTE_OPTIONS.contains(&p) => Err(LedgerError::UnknownOption {
                field: "profile",
                value: raw.trim().to_string(),
            }),
            selected => Ok(selected),
        }
    }
}

/// Serde adapter for option-list fields where "not selected" is stored as `""`.
pub(crate) mod blank_option {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// Parses an optional selection from form text; blank means "not selected".
pub fn parse_selection<T>(raw: &str) -> Result<Option<T>, LedgerError>
where
    T: FromStr<Err = LedgerError>,
{
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

/// A saved purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub invoice_status: InvoiceStatus,
    pub start_date: String,
    pub end_date: String,
    #[serde(with = "blank_option", default)]
    pub order_type: Option<OrderType>,
    #[serde(with = "blank_option", default)]
    pub model: Option<ShoeModel>,
    #[serde(with = "blank_option", default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub sizes: SizeQuantities,
    pub total_pairs: u64,
    pub price_per_pair: f64,
    pub total_boxes: u64,
    pub shipping_per_box: f64,
    pub total_shipping_cost: f64,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
    pub deposit: f64,
    #[serde(default)]
    pub comments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_image_url: Option<String>,
}

/// A saved price quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub date: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(with = "blank_option", default)]
    pub profile: Option<Profile>,
    pub pairs: u64,
    pub price_per_pair: f64,
    pub shipping_cost_per_box: f64,
    #[serde(default)]
    pub production_time: String,
    #[serde(default)]
    pub attached_image_url: Option<String>,
    pub boxes: u64,
    pub total_shipping: f64,
    pub subtotal: f64,
    pub iva: f64,
    pub total: f64,
}

/// Inline edits made from the order history grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub invoice_status: Option<InvoiceStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_name: Option<String>,
    pub deposit: Option<f64>,
    pub comments: Option<String>,
}

/// Inline edits to a stored quote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotePatch {
    pub date: Option<String>,
    pub client_name: Option<String>,
    pub profile: Option<Option<Profile>>,
    pub production_time: Option<String>,
    pub attached_image_url: Option<Option<String>>,
}

impl Record for Order {
    const KIND: RecordKind = RecordKind::Order;
    const STORAGE_KEY: &'static str = crate::config::ORDER_HISTORY_KEY;
    type Patch = OrderPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    /// The order form does not manage comments, deposit overrides or the
    /// payment/invoice workflow, so a re-save keeps the stored values.
    fn merge_edit(prior: &Self, incoming: Self) -> Self {
        Order {
            id: prior.id,
            comments: prior.comments.clone(),
            deposit: prior.deposit,
            payment_status: prior.payment_status,
            invoice_status: prior.invoice_status,
            ..incoming
        }
    }

    fn apply_patch(&mut self, patch: OrderPatch) {
        let previous_start = self.start_date.clone();
        let previous_end = self.end_date.clone();

        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.payment_status {
            self.payment_status = v;
        }
        if let Some(v) = patch.invoice_status {
            self.invoice_status = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = v;
        }
        if let Some(v) = patch.client_name {
            self.client_name = v;
        }
        if let Some(v) = patch.deposit {
            self.deposit = v;
        }
        if let Some(v) = patch.comments {
            self.comments = v;
        }
        if let Some(new_start) = patch.start_date.filter(|s| !s.is_empty()) {
            if !previous_start.is_empty() && !previous_end.is_empty() {
                match crate::calc::shift_end_date(&previous_start, &previous_end, &new_start) {
                    Some(end) => self.end_date = end,
                    None => log::warn!(
                        "order {}: could not shift end date {:?} -> new start {:?}",
                        self.id,
                        previous_end,
                        new_start
                    ),
                }
            }
            self.start_date = new_start;
        }
    }
}

impl Record for Quote {
    const KIND: RecordKind = RecordKind::Quote;
    const STORAGE_KEY: &'static str = crate::config::QUOTE_HISTORY_KEY;
    type Patch = QuotePatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn merge_edit(prior: &Self, incoming: Self) -> Self {
        Quote {
            id: prior.id,
            ..incoming
        }
    }

    fn apply_patch(&mut self, patch: QuotePatch) {
        if let Some(v) = patch.date {
            self.date = v;
        }
        if let Some(v) = patch.client_name {
            self.client_name = v;
        }
        if let Some(v) = patch.profile {
            self.profile = v;
        }
        if let Some(v) = patch.production_time {
            self.production_time = v;
        }
        if let Some(v) = patch.attached_image_url {
            self.attached_image_url = v;
        }
    }

    /// Quotes are always listed newest date first.
    fn arrange(records: &mut [Self]) {
        records.sort_by(|a, b| {
            let a = crate::parse::stored_date(&a.date);
            let b = crate::parse::stored_date(&b.date);
            b.cmp(&a)
        });
    }
}
