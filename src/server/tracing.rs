//! Request spans for the HTTP server.

use std::time::Instant;

use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    HttpMessage,
};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

/// Requests taking longer than this many milliseconds are logged as slow.
/// Webhook deliveries run the whole build, so the bound is generous.
const SLOW_REQUEST_MS: u128 = 10 * 60 * 1000;

/// `DefaultRootSpanBuilder` plus request timings.
pub struct CiRootSpanBuilder;

/// When the request was received.
struct RequestStart(Instant);

impl RootSpanBuilder for CiRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> tracing::Span {
        // Drop the mutable borrow before `root_span!` borrows the request again.
        {
            let mut request_extensions = request.extensions_mut();
            request_extensions.insert(RequestStart(Instant::now()));
        }

        tracing_actix_web::root_span!(
            request,
            duration_ms = tracing::field::Empty,
            github_event = tracing::field::Empty,
        )
    }

    fn on_request_end<B: actix_web::body::MessageBody>(
        span: tracing::Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        if let Ok(response) = outcome.as_ref() {
            let request = response.request();
            if let Some(event) = request
                .headers()
                .get("X-GitHub-Event")
                .and_then(|value| value.to_str().ok())
            {
                span.record("github_event", event);
            }
            if let Some(req_start) = request.extensions().get::<RequestStart>() {
                let millis = req_start.0.elapsed().as_millis();
                span.record("duration_ms", millis);
                if millis > SLOW_REQUEST_MS {
                    tracing::warn!(duration_ms = millis, "Slow HTTP request");
                } else {
                    tracing::trace!("HTTP Request");
                }
            }
        }
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}
