use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declares a fieldless enum stored as lowercase text in the database and
/// sent as the same string over the wire.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

text_enum!(
    Role {
        User => "user",
        Admin => "admin",
        Creative => "creative",
    }
);

text_enum!(
    UserType {
        Client => "client",
        Creative => "creative",
    }
);

text_enum!(
    /// Booking lifecycle. Any status may be set from any other; there is no
    /// transition table.
    BookingStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
        Disputed => "disputed",
    }
);

text_enum!(
    GigStatus {
        Open => "open",
        InProgress => "in_progress",
        Completed => "completed",
        Closed => "closed",
    }
);

text_enum!(
    ApplicationStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    }
);

text_enum!(
    TransactionType {
        Deposit => "deposit",
        FullPayment => "full_payment",
        Refund => "refund",
    }
);

text_enum!(
    TransactionStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
);

text_enum!(
    PaymentMethod {
        Paystack => "paystack",
        Stripe => "stripe",
    }
);

// -- Entities --
//
// Field names serialize in camelCase to match the web client. Money is always
// integer minor units (cents).

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub open_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
    pub role: Role,
    pub user_type: Option<UserType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_signed_in: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeProfile {
    pub id: i64,
    pub user_id: i64,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub categories: Vec<String>,
    pub location: Option<String>,
    pub base_price: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    /// Mean of all review ratings, recomputed whenever a review is added.
    pub average_rating: f64,
    pub total_reviews: i64,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    /// References `CreativeProfile::id`, not the creative's user id.
    pub creative_id: i64,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    /// Minutes between `start_time` and `end_time`.
    pub duration: Option<i64>,
    pub location: Option<String>,
    pub total_price: i64,
    pub deposit_amount: i64,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: i64,
    pub creative_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    pub participant_one_id: i64,
    pub participant_two_id: i64,
    pub booking_id: Option<i64>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participant_one_id == user_id || self.participant_two_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_type: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: i64,
    pub booking_id: i64,
    pub creative_id: i64,
    pub client_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    /// Bytes.
    pub file_size: Option<i64>,
    pub download_count: i64,
    pub uploaded_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub booking_id: i64,
    pub reviewer_id: i64,
    pub creative_id: i64,
    pub rating: i64,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigPost {
    pub id: i64,
    pub client_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub budget: Option<i64>,
    pub location: Option<String>,
    pub deadline: Option<String>,
    pub status: GigStatus,
    pub applications_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigApplication {
    pub id: i64,
    pub gig_post_id: i64,
    pub creative_id: i64,
    pub proposed_price: Option<i64>,
    pub cover_letter: Option<String>,
    pub portfolio_links: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub gig_post_id: Option<i64>,
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount: i64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub payment_method: PaymentMethod,
    pub external_transaction_id: Option<String>,
    pub status: TransactionStatus,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i64,
    pub creative_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub category: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_text_matches_serde() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), *status);
        }
        assert_eq!(GigStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TransactionType::FullPayment.to_string(), "full_payment");
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = "archived".parse::<BookingStatus>().unwrap_err();
        assert_eq!(err.kind, "BookingStatus");
        assert_eq!(err.to_string(), "unknown BookingStatus 'archived'");
        assert!(serde_json::from_str::<PaymentMethod>("\"paypal\"").is_err());
    }

    #[test]
    fn transaction_kind_serializes_as_type() {
        let now = Utc::now();
        let tx = Transaction {
            id: 1,
            booking_id: Some(2),
            gig_post_id: None,
            payer_id: 3,
            payee_id: 4,
            amount: 2_500,
            currency: "USD".into(),
            kind: TransactionType::Deposit,
            payment_method: PaymentMethod::Stripe,
            external_transaction_id: None,
            status: TransactionStatus::Pending,
            metadata: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "deposit");
        assert_eq!(value["paymentMethod"], "stripe");
        assert_eq!(value["payerId"], 3);
    }

    #[test]
    fn conversation_participants() {
        let now = Utc::now();
        let convo = Conversation {
            id: 1,
            participant_one_id: 10,
            participant_two_id: 20,
            booking_id: None,
            last_message: None,
            last_message_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(convo.has_participant(10));
        assert!(convo.has_participant(20));
        assert!(!convo.has_participant(30));
    }
}
