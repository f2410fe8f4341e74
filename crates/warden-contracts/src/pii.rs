//! The PII taxonomy shared by contracts, the detector, and violation codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A class of personally identifiable information.
///
/// The `Display` token is the canonical machine form used in three places:
/// contract `permissions.pii` lists, `pii_out_of_scope:<type>:<path>`
/// violation codes, and `[REDACTED_<TYPE>]` placeholders (uppercased).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Email,
    Phone,
    /// SSN or other government-issued identifier.
    GovernmentId,
    PaymentCard,
    StreetAddress,
    PersonalName,
}

impl PiiType {
    /// Every built-in PII type, in canonical order.
    pub const ALL: [PiiType; 6] = [
        PiiType::Email,
        PiiType::Phone,
        PiiType::GovernmentId,
        PiiType::PaymentCard,
        PiiType::StreetAddress,
        PiiType::PersonalName,
    ];

    /// The canonical lowercase token for this type.
    pub fn token(&self) -> &'static str {
        match self {
            PiiType::Email => "email",
            PiiType::Phone => "phone",
            PiiType::GovernmentId => "government_id",
            PiiType::PaymentCard => "payment_card",
            PiiType::StreetAddress => "street_address",
            PiiType::PersonalName => "personal_name",
        }
    }

    /// The redaction placeholder substituted for a matched value,
    /// e.g. `[REDACTED_EMAIL]`.
    pub fn placeholder(&self) -> String {
        format!("[REDACTED_{}]", self.token().to_uppercase())
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
