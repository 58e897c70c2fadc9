use tracing::info;

use folio_db::models::{ProfileSearch, ProfileUpdate};
use folio_types::api::{IdInput, SearchCreativesInput, UpdateProfileInput};
use folio_types::models::{CreativeProfile, User, UserType};

use super::{page, require_non_negative};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_profile(state: &AppState, me: &User) -> Result<Option<CreativeProfile>, ApiError> {
    let user_id = me.id;
    state.db_or_default(move |db| db.get_profile_by_user(user_id)).await
}

pub async fn get_by_id(state: &AppState, input: IdInput) -> Result<Option<CreativeProfile>, ApiError> {
    state.db_or_default(move |db| db.get_profile(input.id)).await
}

/// Creates the caller's profile on first use, which also marks them as a
/// creative.
pub async fn update_profile(
    state: &AppState,
    me: &User,
    input: UpdateProfileInput,
) -> Result<CreativeProfile, ApiError> {
    if let Some(price) = input.base_price {
        require_non_negative("basePrice", price)?;
    }
    if let Some(rate) = input.hourly_rate {
        require_non_negative("hourlyRate", rate)?;
    }

    let update = ProfileUpdate {
        business_name: input.business_name,
        bio: input.bio,
        categories: input.categories,
        location: input.location,
        base_price: input.base_price,
        hourly_rate: input.hourly_rate,
        profile_image: input.profile_image,
        cover_image: input.cover_image,
    };

    let user_id = me.id;
    let profile = state
        .db(move |db| {
            let profile = db.upsert_profile(user_id, &update)?;
            db.set_user_type(user_id, UserType::Creative)?;
            Ok(profile)
        })
        .await?;
    info!("User {} updated creative profile {}", user_id, profile.id);
    Ok(profile)
}

pub async fn search(
    state: &AppState,
    input: SearchCreativesInput,
) -> Result<Vec<CreativeProfile>, ApiError> {
    let (limit, offset) = page(input.limit, input.offset);
    let search = ProfileSearch {
        category: input.category.filter(|c| !c.is_empty()),
        location: input.location.filter(|l| !l.is_empty()),
        min_rating: input.min_rating,
        limit,
        offset,
    };
    state.db_or_default(move |db| db.search_profiles(&search)).await
}
