use folio_db::models::NewPortfolioItem;
use folio_types::api::{AddPortfolioItemInput, CreativeIdInput};
use folio_types::models::{PortfolioItem, User};

use super::require_profile;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_creative_portfolio(
    state: &AppState,
    input: CreativeIdInput,
) -> Result<Vec<PortfolioItem>, ApiError> {
    state
        .db_or_default(move |db| db.get_creative_portfolio(input.creative_id))
        .await
}

pub async fn add_item(
    state: &AppState,
    me: &User,
    input: AddPortfolioItemInput,
) -> Result<PortfolioItem, ApiError> {
    let profile = require_profile(state, me.id).await?;
    let item = NewPortfolioItem {
        creative_id: profile.id,
        title: input.title,
        description: input.description,
        image_url: input.image_url,
        video_url: input.video_url,
        category: input.category,
    };
    state.db(move |db| db.insert_portfolio_item(&item)).await
}
