use serde::{Deserialize, Serialize};

use crate::models::{BookingStatus, PaymentMethod};

// -- Session --

/// Claims carried by the signed `app_session_id` cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub open_id: String,
    pub app_id: String,
    pub name: String,
    pub exp: usize,
}

// -- System --

#[derive(Debug, Deserialize)]
pub struct HealthInput {
    pub timestamp: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotifyOwnerInput {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// -- Shared lookups --

#[derive(Debug, Deserialize)]
pub struct IdInput {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeIdInput {
    pub creative_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdInput {
    pub booking_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInput {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -- Creative profiles --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileInput {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    #[serde(deserialize_with = "categories::deserialize")]
    pub categories: Option<Vec<String>>,
    pub location: Option<String>,
    pub base_price: Option<i64>,
    pub hourly_rate: Option<i64>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
}

/// Categories arrive either as a list or as a single string holding a JSON
/// array or comma-separated names.
mod categories {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw.map(|raw| match raw {
            Raw::List(list) => list,
            Raw::Text(text) => serde_json::from_str::<Vec<String>>(&text).unwrap_or_else(|_| {
                text.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCreativesInput {
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -- Bookings --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub creative_id: i64,
    pub service_type: String,
    pub description: Option<String>,
    pub booking_date: String,
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`
    pub end_time: String,
    pub location: Option<String>,
    pub total_price: i64,
    pub deposit_amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusInput {
    pub booking_id: i64,
    pub status: BookingStatus,
}

// -- Messaging --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationIdInput {
    pub conversation_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub conversation_id: i64,
    pub content: String,
    pub attachment_url: Option<String>,
    pub attachment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationInput {
    pub other_user_id: i64,
    pub booking_id: Option<i64>,
}

// -- Deliverables --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDeliverableInput {
    pub booking_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_type: String,
    pub file_size: i64,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub booking_id: i64,
    pub creative_id: i64,
    pub rating: i64,
    pub title: Option<String>,
    pub comment: Option<String>,
}

// -- Gig board --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGigPostInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: i64,
    pub location: Option<String>,
    pub deadline: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyForGigInput {
    pub gig_post_id: i64,
    pub proposed_price: i64,
    pub cover_letter: Option<String>,
    pub portfolio_links: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GigPostIdInput {
    pub gig_post_id: i64,
}

// -- Portfolio --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPortfolioItemInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub category: String,
}

// -- Payments --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentInput {
    pub booking_id: i64,
    pub amount: i64,
    pub payment_method: PaymentMethod,
}

// -- Availability --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAvailabilityInput {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

// -- AI assist --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    #[default]
    Professional,
    Casual,
    Creative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BioStyle {
    #[default]
    Professional,
    Creative,
    Friendly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryType {
    Availability,
    Pricing,
    Customization,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSuggestionInput {
    pub service_type: String,
    pub experience: Option<String>,
    pub location: Option<String>,
}

/// Prices here are whole currency units as produced by the model, not cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSuggestion {
    pub base_price: f64,
    pub hourly_rate: f64,
    pub deposit_percentage: f64,
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionInput {
    pub service_type: String,
    pub description: Option<String>,
    pub style: Option<CaptionStyle>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub caption: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTemplateInput {
    pub inquiry_type: InquiryType,
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseTemplateResponse {
    pub template: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBioInput {
    pub name: String,
    pub service_type: String,
    pub experience: Option<String>,
    pub specialties: Option<String>,
    pub style: Option<BioStyle>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileBioResponse {
    pub bio: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptionInput {
    pub service_name: String,
    pub details: Option<String>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceDescriptionResponse {
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeProfileInput {
    pub bio: Option<String>,
    pub service_types: Option<String>,
    pub portfolio_count: Option<i64>,
    pub review_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub priority: Priority,
}
