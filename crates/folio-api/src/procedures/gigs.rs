use tracing::info;

use folio_db::models::{NewGigApplication, NewGigPost};
use folio_types::api::{ApplyForGigInput, CreateGigPostInput, GigPostIdInput, PageInput};
use folio_types::models::{GigApplication, GigPost, GigStatus, User};

use super::{page, require_non_negative, require_profile};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_posts(state: &AppState, input: PageInput) -> Result<Vec<GigPost>, ApiError> {
    let (limit, offset) = page(input.limit, input.offset);
    state
        .db_or_default(move |db| db.get_open_gig_posts(limit, offset))
        .await
}

pub async fn create_post(
    state: &AppState,
    me: &User,
    input: CreateGigPostInput,
) -> Result<GigPost, ApiError> {
    require_non_negative("budget", input.budget)?;
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }

    let post = NewGigPost {
        client_id: me.id,
        title: input.title,
        description: input.description,
        category: input.category,
        budget: input.budget,
        location: input.location,
        deadline: input.deadline,
    };
    let post = state.db(move |db| db.insert_gig_post(&post)).await?;
    info!("Gig post {} opened by user {}", post.id, post.client_id);
    Ok(post)
}

/// Creatives apply to open posts only.
pub async fn apply_for_gig(
    state: &AppState,
    me: &User,
    input: ApplyForGigInput,
) -> Result<GigApplication, ApiError> {
    require_non_negative("proposedPrice", input.proposed_price)?;
    let profile = require_profile(state, me.id).await?;

    let gig_post_id = input.gig_post_id;
    let post = state
        .db(move |db| db.get_gig_post(gig_post_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Gig post"))?;
    if post.status != GigStatus::Open {
        return Err(ApiError::Conflict("Gig post is not open".into()));
    }

    let application = NewGigApplication {
        gig_post_id: post.id,
        creative_id: profile.id,
        proposed_price: input.proposed_price,
        cover_letter: input.cover_letter,
        portfolio_links: input.portfolio_links,
    };
    state.db(move |db| db.insert_gig_application(&application)).await
}

pub async fn get_applications(
    state: &AppState,
    input: GigPostIdInput,
) -> Result<Vec<GigApplication>, ApiError> {
    state
        .db_or_default(move |db| db.get_gig_applications(input.gig_post_id))
        .await
}
