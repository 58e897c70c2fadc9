//! Copywriting helpers backed by the hosted model. Structured answers that
//! fail to parse fall back to fixed defaults instead of erroring.

use serde_json::json;
use tracing::warn;

use folio_types::api::{
    AnalyzeProfileInput, BioStyle, CaptionInput, CaptionResponse, CaptionStyle, InquiryType,
    PricingSuggestion, PricingSuggestionInput, Priority, ProfileAnalysis, ProfileBioInput,
    ProfileBioResponse, ResponseTemplateInput, ResponseTemplateResponse, ServiceDescriptionInput,
    ServiceDescriptionResponse,
};

use crate::error::ApiError;
use crate::llm::{ChatMessage, ResponseFormat};
use crate::state::AppState;

fn or_unspecified(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("Not specified")
}

pub fn default_pricing() -> PricingSuggestion {
    PricingSuggestion {
        base_price: 500.0,
        hourly_rate: 75.0,
        deposit_percentage: 50.0,
        reasoning: "Default pricing. Please adjust based on your experience and market.".into(),
    }
}

pub fn default_analysis() -> ProfileAnalysis {
    ProfileAnalysis {
        strengths: vec!["Profile exists".into()],
        improvements: vec![
            "Add more portfolio items".into(),
            "Encourage client reviews".into(),
        ],
        priority: Priority::Medium,
    }
}

/// Parses model output into `T`, or returns `fallback` when the output is
/// missing or malformed.
fn parse_or<T: serde::de::DeserializeOwned>(text: Option<String>, fallback: T, what: &str) -> T {
    match text.as_deref().map(serde_json::from_str::<T>) {
        Some(Ok(parsed)) => parsed,
        Some(Err(e)) => {
            warn!("Unparsable {} from model, using defaults: {}", what, e);
            fallback
        }
        None => {
            warn!("Empty {} from model, using defaults", what);
            fallback
        }
    }
}

pub fn parse_pricing(text: Option<String>) -> PricingSuggestion {
    parse_or(text, default_pricing(), "pricing suggestion")
}

pub fn parse_analysis(text: Option<String>) -> ProfileAnalysis {
    parse_or(text, default_analysis(), "profile analysis")
}

pub async fn generate_pricing_suggestion(
    state: &AppState,
    input: PricingSuggestionInput,
) -> Result<PricingSuggestion, ApiError> {
    let prompt = format!(
        "Suggest realistic prices for this creative service.\n\
         Service: {}\nExperience: {}\nLocation: {}\n\
         Answer as JSON with basePrice and hourlyRate in USD, depositPercentage \
         between 0 and 100, and a short reasoning.",
        input.service_type,
        or_unspecified(&input.experience),
        or_unspecified(&input.location),
    );
    let messages = [
        ChatMessage::system("You price creative services. Reply with valid JSON only."),
        ChatMessage::user(prompt),
    ];
    let format = ResponseFormat::json_schema(
        "pricing_suggestion",
        json!({
            "type": "object",
            "properties": {
                "basePrice": { "type": "number" },
                "hourlyRate": { "type": "number" },
                "depositPercentage": { "type": "number" },
                "reasoning": { "type": "string" }
            },
            "required": ["basePrice", "hourlyRate", "depositPercentage", "reasoning"],
            "additionalProperties": false
        }),
    );

    let completion = state.llm.invoke(&messages, Some(&format)).await?;
    Ok(parse_pricing(completion.text()))
}

pub async fn generate_caption(
    state: &AppState,
    input: CaptionInput,
) -> Result<CaptionResponse, ApiError> {
    let style = match input.style.unwrap_or_default() {
        CaptionStyle::Professional => "professional",
        CaptionStyle::Casual => "casual",
        CaptionStyle::Creative => "creative",
    };
    let prompt = format!(
        "Write a portfolio caption for a {} professional in a {} voice.\n\
         About the work: {}\n\
         Make it engaging, show off the quality of the work and invite bookings. \
         Stay under 150 words.",
        input.service_type,
        style,
        or_unspecified(&input.description),
    );
    let caption = state
        .llm
        .complete("You write portfolio captions for creatives.", prompt)
        .await?;
    Ok(CaptionResponse { caption })
}

pub async fn generate_response_template(
    state: &AppState,
    input: ResponseTemplateInput,
) -> Result<ResponseTemplateResponse, ApiError> {
    let inquiry = match input.inquiry_type {
        InquiryType::Availability => "a client asking whether you are available",
        InquiryType::Pricing => "a client asking about prices",
        InquiryType::Customization => "a client asking for a custom service",
        InquiryType::General => "a general client question",
    };
    let prompt = format!(
        "Draft a reusable reply to {}.\nContext: {}\n\
         Keep it friendly, professional and short, end with a clear next step, \
         and mark the parts the creative should fill in as [PLACEHOLDER].",
        inquiry,
        or_unspecified(&input.context),
    );
    let template = state
        .llm
        .complete("You help creatives answer client messages.", prompt)
        .await?;
    Ok(ResponseTemplateResponse { template })
}

pub async fn generate_profile_bio(
    state: &AppState,
    input: ProfileBioInput,
) -> Result<ProfileBioResponse, ApiError> {
    let tone = match input.style.unwrap_or_default() {
        BioStyle::Professional => "professional",
        BioStyle::Creative => "creative",
        BioStyle::Friendly => "friendly",
    };
    let prompt = format!(
        "Write a 100 to 150 word portfolio bio for {}, a {}.\n\
         Experience: {}\nSpecialties: {}\nTone: {}\n\
         Lead with what sets them apart and close with an invitation to book.",
        input.name,
        input.service_type,
        or_unspecified(&input.experience),
        or_unspecified(&input.specialties),
        tone,
    );
    let bio = state
        .llm
        .complete("You write short professional bios for creatives.", prompt)
        .await?;
    Ok(ProfileBioResponse { bio })
}

pub async fn generate_service_description(
    state: &AppState,
    input: ServiceDescriptionInput,
) -> Result<ServiceDescriptionResponse, ApiError> {
    let prompt = format!(
        "Describe the service \"{}\" in 75 to 150 words.\nDetails: {}\nAudience: {}\n\
         Say what is included, what the client gets out of it and what to expect.",
        input.service_name,
        or_unspecified(&input.details),
        input
            .target_audience
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or("General"),
    );
    let description = state
        .llm
        .complete("You write service descriptions for creative businesses.", prompt)
        .await?;
    Ok(ServiceDescriptionResponse { description })
}

pub async fn analyze_profile(
    state: &AppState,
    input: AnalyzeProfileInput,
) -> Result<ProfileAnalysis, ApiError> {
    let prompt = format!(
        "Review this creative's profile and suggest concrete improvements.\n\
         Bio: {}\nServices: {}\nPortfolio items: {}\nReviews: {}\n\
         Answer as JSON with strengths and improvements (arrays of strings) and \
         priority (high, medium or low).",
        or_unspecified(&input.bio),
        or_unspecified(&input.service_types),
        input.portfolio_count.unwrap_or(0),
        input.review_count.unwrap_or(0),
    );
    let messages = [
        ChatMessage::system("You help creatives improve their marketplace profiles."),
        ChatMessage::user(prompt),
    ];
    let format = ResponseFormat::json_schema(
        "profile_analysis",
        json!({
            "type": "object",
            "properties": {
                "strengths": { "type": "array", "items": { "type": "string" } },
                "improvements": { "type": "array", "items": { "type": "string" } },
                "priority": { "type": "string", "enum": ["high", "medium", "low"] }
            },
            "required": ["strengths", "improvements", "priority"],
            "additionalProperties": false
        }),
    );

    let completion = state.llm.invoke(&messages, Some(&format)).await?;
    Ok(parse_analysis(completion.text()))
}
