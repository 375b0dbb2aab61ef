use crate::target::Target;
use hyper::{client::HttpConnector, http::uri, Body, Client, Request, Response};
use hyper_timeout::TimeoutConnector;
use std::net::SocketAddr;

pub type ForwardingClient = Client<TimeoutConnector<HttpConnector>, Body>;

/// Re-addresses the inbound request to the selected target and relays its
/// response back verbatim. Timeouts are enforced by the client's connector.
pub async fn forward_request(
  client: &ForwardingClient,
  request: Request<Body>,
  target: &Target,
  client_address: &SocketAddr,
) -> Result<Response<Body>, hyper::Error> {
  let backend_request = backend_request(request, target, client_address);
  client.request(backend_request).await
}

fn backend_request(request: Request<Body>, target: &Target, client_address: &SocketAddr) -> Request<Body> {
  let path_and_query = request
    .uri()
    .path_and_query()
    .map(|path_and_query| path_and_query.as_str())
    .unwrap_or("/");
  let uri = uri::Builder::new()
    .scheme("http")
    .authority(target.authority())
    .path_and_query(path_and_query)
    .build()
    .unwrap();

  let builder = Request::builder().uri(uri);
  request
    .headers()
    .iter()
    .fold(builder, |builder, (key, val)| builder.header(key, val))
    .header("x-forwarded-for", client_address.ip().to_string())
    .method(request.method())
    .body(request.into_body())
    .unwrap()
}
