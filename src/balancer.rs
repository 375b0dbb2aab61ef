use crate::{
  error_response::{handle_bad_gateway, service_unavailable},
  health::{HealthChecker, HealthConfig},
  load_balancing::{LoadBalancingContext, LoadBalancingStrategy},
  proxy::{self, ForwardingClient},
  target::Target,
};
use hyper::{client::HttpConnector, Body, Client, Request, Response};
use hyper_timeout::TimeoutConnector;
use log::debug;
use std::{
  net::SocketAddr,
  sync::Arc,
  time::{Duration, Instant},
};
use tokio::task::JoinHandle;

/// Owns the configured target list, the scheduling strategy and the health
/// checker, and ties the three together for every inbound request.
pub struct Balancer {
  targets: Vec<Arc<Target>>,
  strategy: Box<dyn LoadBalancingStrategy>,
  client: ForwardingClient,
  health_task: JoinHandle<()>,
}

impl Balancer {
  /// Starts the health checker immediately. Every target counts as healthy
  /// until the first probe cycle completes.
  pub fn new(
    strategy: Box<dyn LoadBalancingStrategy>,
    targets: Vec<Arc<Target>>,
    health_config: HealthConfig,
    request_timeout: Duration,
  ) -> Balancer {
    let health_task = tokio::spawn(HealthChecker::new(targets.clone(), health_config).watch());

    let http_connector = HttpConnector::new();
    let mut connector = TimeoutConnector::new(http_connector);
    connector.set_connect_timeout(Some(request_timeout));
    connector.set_read_timeout(Some(request_timeout));
    connector.set_write_timeout(Some(request_timeout));
    let client = Client::builder().build::<_, Body>(connector);

    Balancer {
      targets,
      strategy,
      client,
      health_task,
    }
  }

  pub async fn handle(&self, request: Request<Body>, client_address: SocketAddr) -> Response<Body> {
    let healthy_targets = self
      .targets
      .iter()
      .filter(|target| target.is_healthy())
      .cloned()
      .collect::<Vec<_>>();

    let target = {
      let context = LoadBalancingContext {
        client_address: &client_address,
        request: &request,
      };
      match self.strategy.select_target(&context, &healthy_targets) {
        Some(target) => target.clone(),
        None => return service_unavailable(),
      }
    };

    debug!("forwarding request to {}", target.authority());
    let _in_flight = target.begin_request();
    let before_forward = Instant::now();
    let result = proxy::forward_request(&self.client, request, &target, &client_address).await;
    target.record_response_time(before_forward.elapsed());

    match result {
      Ok(response) => response,
      // A failed forward only affects this request. Health state changes
      // through the probe cycle alone.
      Err(error) => handle_bad_gateway(error),
    }
  }

  /// Stops the health checker. Dropping the balancer does the same.
  pub fn shutdown(&self) {
    self.health_task.abort();
  }
}

impl Drop for Balancer {
  fn drop(&mut self) {
    self.health_task.abort();
  }
}
