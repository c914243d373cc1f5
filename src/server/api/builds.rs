//! Read-only views of the build history, as HTML pages and as JSON.
use super::state::Global;
use crate::db::models::build_record::BuildRecord;
use crate::db::models::commit::Commit;
use crate::errors::PersistenceError;
use crate::server::errors::HTTPError;
use crate::server::views::{BuildPageView, IndexView};
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use askama::Template;
use serde_derive::Serialize;

/// A build record together with the commits it was triggered by.
#[derive(Debug, Serialize)]
pub struct BuildView {
    /// The stored record.
    #[serde(flatten)]
    pub record: BuildRecord,
    /// Commits of the push, in push order.
    pub commits: Vec<Commit>,
}

/// HTML list linking to every recorded build.
#[tracing::instrument(skip(data))]
pub async fn index<T: Global>(data: web::Data<T>) -> Result<HttpResponse, HTTPError> {
    let records = data
        .history()
        .get_all_build_records()
        .await
        .map_err(internal)?;
    render(&IndexView::new(&records))
}

/// HTML page for a single build.
#[tracing::instrument(skip(data))]
pub async fn build_page<T: Global>(
    path: web::Path<i64>,
    data: web::Data<T>,
) -> Result<HttpResponse, HTTPError> {
    let view = find_build(data.get_ref(), path.into_inner()).await?;
    render(&BuildPageView::new(&view.record, &view.commits))
}

/// JSON list of every recorded build.
#[tracing::instrument(skip(data))]
pub async fn list_builds<T: Global>(data: web::Data<T>) -> Result<HttpResponse, HTTPError> {
    let history = data.history();
    let records = history.get_all_build_records().await.map_err(internal)?;
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        let commits = history.get_commits_for(record.id).await.map_err(internal)?;
        views.push(BuildView { record, commits });
    }
    Ok(HttpResponse::Ok().json(views))
}

/// JSON view of a single build.
#[tracing::instrument(skip(data))]
pub async fn get_build<T: Global>(
    path: web::Path<i64>,
    data: web::Data<T>,
) -> Result<HttpResponse, HTTPError> {
    let view = find_build(data.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Load a build record and its commits, or `BuildNotFound`.
async fn find_build<T: Global>(state: &T, id: i64) -> Result<BuildView, HTTPError> {
    let history = state.history();
    let record = history
        .get_build_record(id)
        .await
        .map_err(internal)?
        .ok_or(HTTPError::BuildNotFound)?;
    let commits = history.get_commits_for(id).await.map_err(internal)?;
    Ok(BuildView { record, commits })
}

/// Log a store failure and hide its details from the client.
fn internal(err: PersistenceError) -> HTTPError {
    tracing::error!("{err}");
    HTTPError::InternalServerError
}

/// Render `view` into a `200 OK` HTML response.
///
/// A template failure is logged and surfaces as a 500.
fn render<V: Template>(view: &V) -> Result<HttpResponse, HTTPError> {
    match view.render() {
        Ok(body) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(body)),
        Err(err) => {
            tracing::error!("Template rendering failed: {err}");
            Err(HTTPError::InternalServerError)
        }
    }
}
