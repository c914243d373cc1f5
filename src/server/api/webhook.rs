//! Webhook endpoint receiving push deliveries.
use super::state::Global;
use crate::ci::controller::{handle_push, PushOutcome};
use crate::ci::push::PushEvent;
use crate::server::errors::HTTPError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

/// Header naming the kind of event being delivered.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Handle a webhook delivery.
///
/// `ping` deliveries are answered with `pong`, other non-push events are acknowledged
/// and ignored. A push is built and recorded before the response is sent; the URL
/// the delivery was posted to becomes the status details link.
///
/// # Errors
/// `BadRequest` if the payload cannot be decoded, `InternalServerError` if the build
/// could not be recorded.
#[tracing::instrument(skip_all)]
pub async fn webhook<T: Global>(
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<T>,
) -> Result<HttpResponse, HTTPError> {
    let event = req
        .headers()
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("push");
    match event {
        "push" => {}
        "ping" => return Ok(HttpResponse::Ok().body("pong")),
        other => {
            tracing::debug!(event = other, "Ignoring webhook event");
            return Ok(HttpResponse::Accepted().body(format!("Ignored event: {other}")));
        }
    }

    let push = PushEvent::from_json(&body).map_err(|err| {
        tracing::warn!("Could not decode push payload: {err:#}");
        HTTPError::BadRequest {
            reason: format!("{err:#}"),
        }
    })?;
    let details_url = req.full_url().to_string();
    let notifier = data.notifier().for_push(&push);

    match handle_push(data.build_context(), &notifier, &push, &details_url).await {
        Ok(PushOutcome::Recorded { build_id, outcome }) => {
            Ok(HttpResponse::Ok().json(json!({ "build_id": build_id, "outcome": outcome })))
        }
        Ok(PushOutcome::Aborted { reason }) => {
            Ok(HttpResponse::Ok().body(format!("No build recorded: {reason}")))
        }
        Err(err) => {
            tracing::error!("{err}");
            Err(HTTPError::InternalServerError)
        }
    }
}
