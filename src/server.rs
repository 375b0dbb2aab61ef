use crate::balancer::Balancer;
use futures::Future;
use hyper::{
  server::conn::AddrStream,
  service::{make_service_fn, Service},
  Body, Request, Response, Server,
};
use log::{debug, info};
use std::{
  io,
  net::SocketAddr,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll},
};

/// Binds the listener and serves until ctrl-c, then stops the balancer's
/// health checker.
pub async fn create(address: SocketAddr, balancer: Arc<Balancer>) -> Result<(), io::Error> {
  let service_balancer = balancer.clone();
  let service = make_service_fn(move |stream: &AddrStream| {
    let client_address = stream.remote_addr();
    let balancer = service_balancer.clone();

    async move {
      Ok::<_, io::Error>(BalancerService {
        client_address,
        balancer,
      })
    }
  });

  info!("listening on http://{}", address);
  let result = Server::try_bind(&address)
    .map_err(|e| io::Error::new(io::ErrorKind::AddrInUse, e))?
    .serve(service)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| {
      let msg = format!("Failed to listen server: {}", e);
      io::Error::new(io::ErrorKind::Other, msg)
    });

  balancer.shutdown();
  result
}

async fn shutdown_signal() {
  let _ = tokio::signal::ctrl_c().await;
  info!("received shutdown signal");
}

pub struct BalancerService {
  client_address: SocketAddr,
  balancer: Arc<Balancer>,
}

impl Service<Request<Body>> for BalancerService {
  type Response = Response<Body>;
  type Error = hyper::Error;

  // let's allow this complex type. A refactor would make it more complicated due to the used trait types
  #[allow(clippy::type_complexity)]
  type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

  fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
    Poll::Ready(Ok(()))
  }

  fn call(&mut self, request: Request<Body>) -> Self::Future {
    debug!("{:#?} {} {}", request.version(), request.method(), request.uri());

    let balancer = self.balancer.clone();
    let client_address = self.client_address;
    Box::pin(async move { Ok(balancer.handle(request, client_address).await) })
  }
}
