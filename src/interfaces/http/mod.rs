use crate::application::{PipelineReport, PipelineUseCase};
use crate::domain::error::AppError;
use crate::domain::trigger::{S3Event, TriggerRecord};
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct HttpState {
    pub pipeline: Arc<PipelineUseCase>,
}

#[derive(Debug, Serialize)]
pub struct RecordFailure {
    pub bucket: String,
    pub key: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub reports: Vec<PipelineReport>,
    pub failures: Vec<RecordFailure>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::UnsupportedFormat(_) | AppError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::ObjectNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Every record in the batch runs, one after another. The response status
/// follows the first failed record, if any.
#[post("/events")]
async fn handle_event(data: web::Data<HttpState>, event: web::Json<S3Event>) -> impl Responder {
    let records = match event.trigger_records() {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Rejected event");
            return HttpResponse::build(status_for(&e)).json(ErrorBody {
                error: e.to_string(),
            });
        }
    };

    info!(records = records.len(), "Received event");

    let mut reports = Vec::with_capacity(records.len());
    let mut failures = Vec::new();
    let mut status = StatusCode::OK;

    for record in &records {
        match data.pipeline.execute(record).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(bucket = %record.bucket, key = %record.key, error = %e, "Pipeline failed");
                if failures.is_empty() {
                    status = status_for(&e);
                }
                failures.push(failure(record, &e));
            }
        }
    }

    HttpResponse::build(status).json(EventResponse { reports, failures })
}

fn failure(record: &TriggerRecord, err: &AppError) -> RecordFailure {
    RecordFailure {
        bucket: record.bucket.clone(),
        key: record.key.clone(),
        error: err.to_string(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(handle_event);
}

pub fn start_server(pipeline: Arc<PipelineUseCase>, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { pipeline });

    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host, port))?
        .run();

    info!("HTTP server listening on {}:{}", host, port);
    Ok(server)
}
