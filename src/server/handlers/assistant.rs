use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn ask_ai(State(state): State<AppState>, Form(form): Form<AskForm>) -> Html<String> {
    let question = form.query.unwrap_or_default();
    let outcome = state.chat.ask(&question).await;
    Html(outcome.to_html())
}
