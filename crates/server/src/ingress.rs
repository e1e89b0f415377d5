use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use kudos_slack::{
    commands::SlashCommandPayload,
    events::{
        DispatchError, EventContext, EventDispatcher, EventHandlerError, HandlerResult,
        SlackEnvelope, SlackEvent,
    },
    signature::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    submission::view_errors_response,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::deliveries::DeliveryQueue;

#[derive(Clone)]
pub struct IngressState {
    verifier: Arc<RequestVerifier>,
    dispatcher: Arc<EventDispatcher>,
    deliveries: DeliveryQueue,
}

impl IngressState {
    pub fn new(
        verifier: RequestVerifier,
        dispatcher: EventDispatcher,
        deliveries: DeliveryQueue,
    ) -> Self {
        Self { verifier: Arc::new(verifier), dispatcher: Arc::new(dispatcher), deliveries }
    }
}

pub fn router(state: IngressState) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/interactions", post(interaction))
        .with_state(state)
}

#[derive(Deserialize)]
struct InteractionForm {
    payload: String,
}

async fn slash_command(
    State(state): State<IngressState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = new_context();
    if let Err(response) = verify(&state, &headers, &body, &ctx) {
        return response;
    }

    let payload: SlashCommandPayload = match serde_urlencoded::from_bytes(&body) {
        Ok(payload) => payload,
        Err(parse_error) => return bad_request(&ctx, "slash command", parse_error),
    };
    info!(
        event_name = "slack.command.received",
        correlation_id = %ctx.correlation_id,
        command = %payload.command,
        user_id = %payload.user_id,
        "received slash command"
    );

    let envelope = envelope(&ctx, SlackEvent::SlashCommand(payload));
    match state.dispatcher.dispatch(&envelope, &ctx).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(DispatchError::Handler(EventHandlerError::Parse(parse_error))) => {
            warn!(
                event_name = "slack.command.unsupported",
                correlation_id = %ctx.correlation_id,
                error = %parse_error,
                "unsupported slash command"
            );
            (StatusCode::OK, format!("Sorry, I only understand `/kudos`. ({parse_error})"))
                .into_response()
        }
        Err(dispatch_error) => {
            error!(
                event_name = "slack.command.failed",
                correlation_id = %ctx.correlation_id,
                error = %dispatch_error,
                "slash command handling failed"
            );
            StatusCode::OK.into_response()
        }
    }
}

async fn interaction(
    State(state): State<IngressState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = new_context();
    if let Err(response) = verify(&state, &headers, &body, &ctx) {
        return response;
    }

    let form: InteractionForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(parse_error) => return bad_request(&ctx, "interaction form", parse_error),
    };
    let payload: Value = match serde_json::from_str(&form.payload) {
        Ok(payload) => payload,
        Err(parse_error) => return bad_request(&ctx, "interaction payload", parse_error),
    };

    let envelope = envelope(&ctx, SlackEvent::from_interaction(&payload));
    match state.dispatcher.dispatch(&envelope, &ctx).await {
        Ok(HandlerResult::ViewErrors(errors)) => {
            (StatusCode::OK, Json(view_errors_response(&errors))).into_response()
        }
        Ok(HandlerResult::Accepted(post)) => {
            state.deliveries.spawn(post, ctx);
            StatusCode::OK.into_response()
        }
        Ok(HandlerResult::Processed | HandlerResult::Ignored) => StatusCode::OK.into_response(),
        Err(dispatch_error) => {
            error!(
                event_name = "slack.interaction.failed",
                correlation_id = %ctx.correlation_id,
                error = %dispatch_error,
                "interaction handling failed"
            );
            StatusCode::OK.into_response()
        }
    }
}

fn new_context() -> EventContext {
    EventContext { correlation_id: Uuid::new_v4().to_string() }
}

fn envelope(ctx: &EventContext, event: SlackEvent) -> SlackEnvelope {
    SlackEnvelope { envelope_id: ctx.correlation_id.clone(), event }
}

fn verify(
    state: &IngressState,
    headers: &HeaderMap,
    body: &[u8],
    ctx: &EventContext,
) -> Result<(), Response> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
    state
        .verifier
        .verify(header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER), body, Utc::now().timestamp())
        .map_err(|signature_error| {
            warn!(
                event_name = "slack.request.rejected",
                correlation_id = %ctx.correlation_id,
                error = %signature_error,
                "rejected unsigned or stale request"
            );
            (StatusCode::UNAUTHORIZED, "invalid request signature").into_response()
        })
}

fn bad_request(ctx: &EventContext, what: &str, parse_error: impl std::fmt::Display) -> Response {
    warn!(
        event_name = "slack.request.malformed",
        correlation_id = %ctx.correlation_id,
        error = %parse_error,
        "could not parse {what}"
    );
    (StatusCode::BAD_REQUEST, format!("malformed {what}")).into_response()
}
