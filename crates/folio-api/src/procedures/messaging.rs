use folio_db::models::NewMessage;
use folio_types::api::{ConversationIdInput, SendMessageInput, StartConversationInput};
use folio_types::models::{Conversation, Message, User};

use super::load_booking;
use crate::error::ApiError;
use crate::state::AppState;

/// Loads the conversation and checks the caller takes part in it.
async fn participant_conversation(
    state: &AppState,
    me: &User,
    conversation_id: i64,
) -> Result<Conversation, ApiError> {
    let conversation = state
        .db(move |db| db.get_conversation(conversation_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Conversation"))?;
    if !conversation.has_participant(me.id) {
        return Err(ApiError::not_owner());
    }
    Ok(conversation)
}

pub async fn get_conversations(state: &AppState, me: &User) -> Result<Vec<Conversation>, ApiError> {
    let user_id = me.id;
    state.db_or_default(move |db| db.get_user_conversations(user_id)).await
}

pub async fn get_messages(
    state: &AppState,
    me: &User,
    input: ConversationIdInput,
) -> Result<Vec<Message>, ApiError> {
    if !state.has_database() {
        return Ok(Vec::new());
    }
    let conversation = participant_conversation(state, me, input.conversation_id).await?;
    state
        .db(move |db| db.get_conversation_messages(conversation.id))
        .await
}

pub async fn send_message(
    state: &AppState,
    me: &User,
    input: SendMessageInput,
) -> Result<Message, ApiError> {
    if input.content.trim().is_empty() && input.attachment_url.is_none() {
        return Err(ApiError::BadRequest("Message needs content or an attachment".into()));
    }
    let conversation = participant_conversation(state, me, input.conversation_id).await?;

    let message = NewMessage {
        conversation_id: conversation.id,
        sender_id: me.id,
        content: input.content,
        attachment_url: input.attachment_url,
        attachment_type: input.attachment_type,
    };
    state.db(move |db| db.insert_message(&message)).await
}

/// Returns the existing conversation between the two users in either order,
/// creating it when there is none.
pub async fn start_conversation(
    state: &AppState,
    me: &User,
    input: StartConversationInput,
) -> Result<Conversation, ApiError> {
    if input.other_user_id == me.id {
        return Err(ApiError::BadRequest("Cannot start a conversation with yourself".into()));
    }
    let other_id = input.other_user_id;
    if state.db(move |db| db.get_user_by_id(other_id)).await?.is_none() {
        return Err(ApiError::not_found("User"));
    }

    let booking_id = match input.booking_id {
        Some(id) => Some(load_booking(state, id).await?.id),
        None => None,
    };

    let user_id = me.id;
    state
        .db(move |db| db.find_or_create_conversation(user_id, other_id, booking_id))
        .await
}
