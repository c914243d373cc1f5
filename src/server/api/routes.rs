//! A central place to register App routes.
use super::state::Global;
use super::{builds, webhook::webhook};
use actix_service::ServiceFactory;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    web, App, Error,
};

/// Largest webhook body accepted, matching the cap on GitHub deliveries.
const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Central place to register all the App routing.
///
/// Webhook deliveries are accepted on `/` and `/webhook`. The history is served as
/// HTML on `/` and `/build_{id}/`, and as JSON under `/_api/builds`.
#[tracing::instrument(skip(app, state))]
pub fn register_app<
    T: Global + Clone + 'static,
    U: MessageBody,
    V: ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<U>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
>(
    app: App<V>,
    state: &T,
) -> App<V> {
    app.app_data(web::Data::new(state.clone()))
        .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
        .service(
            web::scope("/_api").service(
                web::scope("/builds")
                    .service(web::resource("").route(web::get().to(builds::list_builds::<T>)))
                    .service(web::resource("/{id}").route(web::get().to(builds::get_build::<T>))),
            ),
        )
        .service(web::resource("/webhook").route(web::post().to(webhook::<T>)))
        .service(
            web::resource(["/build_{id}/", "/build_{id}"])
                .route(web::get().to(builds::build_page::<T>)),
        )
        .service(
            web::resource("/")
                .route(web::get().to(builds::index::<T>))
                .route(web::post().to(webhook::<T>)),
        )
}
