use customer_risk_infer::errors::{ErrorResponse, InferError, NOT_FOUND};
use customer_risk_infer::service::PredictionService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::TryFrom;
use std::sync::Arc;
use tide::security::{CorsMiddleware, Origin};
use tide::{Body, Request, Response, StatusCode};
use tracing::{error, warn};

#[derive(Clone)]
pub struct State {
    pub service: Arc<PredictionService>,
}

impl State {
    pub fn new(service: PredictionService) -> Self {
        State {
            service: Arc::new(service),
        }
    }
}

pub fn build_app(state: State) -> tide::Server<State> {
    let cors = CorsMiddleware::new()
        .allow_origin(Origin::from(state.service.config().cors_origin.clone()))
        .allow_credentials(true);

    let mut app = tide::with_state(state);
    app.with(cors);
    app.with(tide::log::LogMiddleware::new());

    app.at("/health").get(health);
    app.at("/api/churn/knn")
        .post(|req: Request<State>| predict(req, PredictionService::predict_churn_knn));
    app.at("/api/churn/logreg")
        .post(|req: Request<State>| predict(req, PredictionService::predict_churn_logreg));
    app.at("/api/credit/kmeans")
        .post(|req: Request<State>| predict(req, PredictionService::predict_credit_segment));
    app.at("/").all(not_found);
    app.at("*").all(not_found);
    app
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> tide::Result {
    let mut res = Response::new(status);
    res.set_body(Body::from_json(body)?);
    Ok(res)
}

fn error_response(err: &InferError) -> tide::Result {
    let status =
        StatusCode::try_from(err.status_code()).unwrap_or(StatusCode::InternalServerError);
    if status.is_server_error() {
        error!(kind = err.kind(), error = %err, "request failed");
    } else {
        warn!(kind = err.kind(), error = %err, "request rejected");
    }
    json_response(status, &err.to_response())
}

async fn health(req: Request<State>) -> tide::Result {
    json_response(StatusCode::Ok, &req.state().service.health())
}

async fn predict<Req, Res, F>(mut req: Request<State>, run: F) -> tide::Result
where
    Req: DeserializeOwned,
    Res: Serialize,
    F: Fn(&PredictionService, &Req) -> Result<Res, InferError>,
{
    let body: Req = match req.body_json().await {
        Ok(body) => body,
        Err(e) => {
            return error_response(&InferError::validation(
                "body",
                format!("is not a valid request: {}", e),
            ))
        }
    };
    let service: &PredictionService = &req.state().service;
    match run(service, &body) {
        Ok(response) => json_response(StatusCode::Ok, &response),
        Err(err) => error_response(&err),
    }
}

async fn not_found(req: Request<State>) -> tide::Result {
    json_response(
        StatusCode::NotFound,
        &ErrorResponse::new(
            NOT_FOUND,
            format!("no route for {} {}", req.method(), req.url().path()),
        ),
    )
}
