use crate::base::{predict_table, Predictor};
use crate::codec::decode_http_payload;
use crate::errors::PredictError;
use std::sync::Arc;
use tide::http::mime;
use tide::{Request, Response, StatusCode};
use tracing::{info, warn};

#[derive(Clone)]
pub struct PredictState {
    pub predictor: Arc<dyn Predictor>,
}

pub fn build_app(state: PredictState) -> tide::Server<PredictState> {
    let mut app = tide::with_state(state);
    app.with(tide::log::LogMiddleware::new());

    app.at("/").get(|_req: Request<PredictState>| async { Ok("yo!") });

    app.at("/predict")
        .post(|mut req: Request<PredictState>| async move {
            let body = req.body_bytes().await?;
            let predictor = req.state().predictor.clone();
            match handle_predict(&body, predictor.as_ref()) {
                Ok(json) => Ok(Response::builder(StatusCode::Ok)
                    .body(json)
                    .content_type(mime::JSON)
                    .build()),
                Err(e) => {
                    warn!(error = %e, "predict request failed");
                    let status = if e.is_client_error() {
                        StatusCode::BadRequest
                    } else {
                        StatusCode::InternalServerError
                    };
                    Ok(Response::builder(status)
                        .body(e.to_string())
                        .content_type(mime::PLAIN)
                        .build())
                }
            }
        });

    app
}

fn handle_predict(body: &[u8], predictor: &dyn Predictor) -> Result<String, PredictError> {
    let table = decode_http_payload(body)?;
    let result = predict_table(&table, predictor)?;
    info!(rows = result.num_rows(), "served prediction");
    result.to_split_json()
}
