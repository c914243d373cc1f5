//! Run the CI server.
#![allow(clippy::exit, clippy::module_name_repetitions)]
use crate::ci::build_tool::CommandBuildTool;
use crate::ci::controller::BuildContext;
use crate::ci::notifier::NotifierSettings;
use crate::config::Config;
use crate::db;
use crate::history::HistoryStore;
use crate::server::api::routes;
use crate::server::api::state::{App as AppState, Global};
use crate::server::tracing::CiRootSpanBuilder;
use actix_http::body::MessageBody;
use actix_service::ServiceFactory;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{App, Error, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, process};
use tracing_actix_web::TracingLogger;

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Interface to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Parent directory of build workspaces.
    pub workspace_root: PathBuf,
    /// History database URL.
    pub database_url: String,
    /// Base URL of the commit status API.
    pub status_api_url: String,
    /// Build tool settings.
    pub config: Config,
}

/// Serve the webhook endpoint and the build history.
#[actix_web::main]
pub async fn serve(options: ServeOptions) -> io::Result<()> {
    let ServeOptions {
        host,
        port,
        workspace_root,
        database_url,
        status_api_url,
        config,
    } = options;

    let db = match db::init::connect(&database_url).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(
                "error: could not connect to database. Confirm that DATABASE_URL env var is set correctly."
            );
            tracing::error!("Error: {:?}", err);
            process::exit(1);
        }
    };

    let state = AppState {
        context: BuildContext {
            history: HistoryStore::new(db),
            build_tool: Arc::new(CommandBuildTool::new(config.build)),
            workspace_root,
        },
        notifier: NotifierSettings::from_env(&status_api_url),
    };

    tracing::info!(
        workspace_root = %state.context.workspace_root.display(),
        "Running CI server on http://{host}:{port}"
    );
    HttpServer::new(move || init_app(&state))
        .bind((host.as_str(), port))?
        .run()
        .await
}

/// Initialize the application and all possible routing at start-up time.
pub fn init_app<T: Global + Clone + 'static>(
    state: &T,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = Error,
    >,
> {
    routes::register_app(
        App::new().wrap(TracingLogger::<CiRootSpanBuilder>::new()),
        state,
    )
}
