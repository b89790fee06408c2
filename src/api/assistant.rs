use rocket::{serde::json::Json, Route, State};

use crate::assistant::AssistantClient;
use crate::error::Result;
use crate::model::api::chat::{ChatMessage, ChatReply};

pub fn routes() -> Vec<Route> {
    routes![chat]
}

#[post("/assistant/chat", data = "<message>", format = "json")]
async fn chat(
    message: Json<ChatMessage>,
    assistant: &State<AssistantClient>,
) -> Result<Json<ChatReply>> {
    let reply = assistant.chat(&message.message).await?;
    Ok(Json(ChatReply { reply }))
}
