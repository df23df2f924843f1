use {
    super::{
        id::{OrderId, UserId},
        money::MoneyAmount,
    },
    chrono::{DateTime, Utc},
    derive_more::Display,
    serde::Serialize,
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    #[display("shipping")]
    Shipping,
    #[display("billing")]
    Billing,
}

/// A validated postal address taken from a completed checkout, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl PostalAddress {
    /// Envelope-style lines: name, street, city line, country.
    pub fn lines(&self) -> [String; 4] {
        let city_line = match &self.state {
            Some(state) => format!("{}, {} {}", self.city, state, self.postal_code),
            None => format!("{} {}", self.city, self.postal_code),
        };
        [
            self.name.clone(),
            self.street.clone(),
            city_line,
            self.country.clone(),
        ]
    }
}

/// An address row owned by exactly one order. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAddress {
    pub id: Uuid,
    #[serde(flatten)]
    pub address: PostalAddress,
}

/// The configured phone case. Read-only here; shown in the confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub color: String,
    pub material: String,
    pub finish: String,
    pub model: String,
    pub cropped_image_url: Option<String>,
}

impl Configuration {
    pub fn summary(&self) -> String {
        format!(
            "{} case, {} {} finish, {}",
            self.model, self.color, self.finish, self.material
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub is_paid: bool,
    pub amount: MoneyAmount,
    pub configuration: Configuration,
    pub shipping_address: Option<StoredAddress>,
    pub billing_address: Option<StoredAddress>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of the paid transition.
#[derive(Debug, Clone)]
pub enum MarkPaid {
    /// Order went from unpaid to paid; both addresses were created.
    Transitioned(Order),
    /// Order was already paid. Nothing was written.
    AlreadyPaid(Order),
}

impl MarkPaid {
    pub fn order(&self) -> &Order {
        match self {
            Self::Transitioned(order) | Self::AlreadyPaid(order) => order,
        }
    }
}
