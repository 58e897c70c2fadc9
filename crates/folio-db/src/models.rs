//! Insert and update shapes. Rows come back as `folio_types::models` values;
//! these structs only describe what a caller writes.

use chrono::{DateTime, Utc};
use folio_types::models::{PaymentMethod, Role};

/// Identity fields refreshed from the identity provider on sign-in.
#[derive(Debug, Clone, Default)]
pub struct IdentityFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub open_id: String,
    /// `None` leaves stored identity fields untouched.
    pub identity: Option<IdentityFields>,
    /// `None` keeps the stored role (`user` for new rows).
    pub role: Option<Role>,
    pub last_signed_in: DateTime<Utc>,
}

/// Partial profile update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub categories: Option<Vec<String>>,
    pub location: Option<String>,
    pub base_price: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSearch {
    /// Must be one of the profile's categories.
    pub category: Option<String>,
    /// Case-insensitive equality.
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_id: i64,
    pub creative_id: i64,
    pub service_type: String,
    pub description: Option<String>,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: i64,
    pub location: Option<String>,
    pub total_price: i64,
    pub deposit_amount: i64,
}

#[derive(Debug, Clone)]
pub struct NewAvailabilitySlot {
    pub creative_id: i64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDeliverable {
    pub booking_id: i64,
    pub creative_id: i64,
    pub client_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub file_size: i64,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: i64,
    pub reviewer_id: i64,
    pub creative_id: i64,
    pub rating: i64,
    pub title: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGigPost {
    pub client_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: i64,
    pub location: Option<String>,
    pub deadline: String,
}

#[derive(Debug, Clone)]
pub struct NewGigApplication {
    pub gig_post_id: i64,
    pub creative_id: i64,
    pub proposed_price: i64,
    pub cover_letter: Option<String>,
    pub portfolio_links: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPortfolioItem {
    pub creative_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub category: String,
}

/// Always recorded as a pending USD deposit.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub booking_id: i64,
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount: i64,
    pub payment_method: PaymentMethod,
}
