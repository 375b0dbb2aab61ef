use hyper::{Body, Response, StatusCode};
use log::error;
use std::error::Error;

pub fn service_unavailable() -> Response<Body> {
  Response::builder()
    .status(StatusCode::SERVICE_UNAVAILABLE)
    .body(Body::empty())
    .unwrap()
}

pub fn handle_bad_gateway<E: Error>(error: E) -> Response<Body> {
  log_error(error);
  bad_gateway()
}

pub fn bad_gateway() -> Response<Body> {
  Response::builder()
    .status(StatusCode::BAD_GATEWAY)
    .body(Body::empty())
    .unwrap()
}

pub fn log_error<E: Error>(error: E) {
  error!("{}", error);
}
