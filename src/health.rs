use crate::target::Target;
use futures::future::join_all;
use hyper::{client::HttpConnector, http::uri, Client, StatusCode, Uri};
use hyper_timeout::TimeoutConnector;
use log::info;
use serde::Deserialize;
use std::{fmt, sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthConfig {
  /// Seconds between two probe cycles.
  pub interval: u64,
  /// Per-probe timeout in milliseconds, independent of the request path's timeout.
  pub timeout: u64,
  /// Path appended to each target's base address, e.g. `/health`.
  pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Healthiness {
  Healthy,
  Unresponsive(Option<StatusCode>),
}

impl fmt::Display for Healthiness {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Healthiness::Healthy => write!(f, "Healthy"),
      Healthiness::Unresponsive(Some(status_code)) => write!(f, "Unresponsive, status: {}", status_code),
      Healthiness::Unresponsive(None) => write!(f, "Unresponsive"),
    }
  }
}

/// Probes every configured target on a fixed interval and keeps each target's
/// healthiness current. Runs independently of the request path; a target's
/// membership in the healthy subset only ever changes here.
pub struct HealthChecker {
  targets: Vec<Arc<Target>>,
  config: HealthConfig,
}

impl HealthChecker {
  pub fn new(targets: Vec<Arc<Target>>, config: HealthConfig) -> HealthChecker {
    HealthChecker { targets, config }
  }

  pub async fn watch(self) {
    let period = Duration::from_secs(self.config.interval);
    let mut interval_timer = interval_at(Instant::now() + period, period);
    loop {
      interval_timer.tick().await;
      self.probe_all().await;
    }
  }

  async fn probe_all(&self) {
    let probes = self.targets.iter().map(|target| probe_target(target, &self.config));
    join_all(probes).await;
  }
}

async fn probe_target(target: &Arc<Target>, config: &HealthConfig) {
  let uri = uri::Builder::new()
    .scheme("http")
    .authority(target.authority())
    .path_and_query(config.path.as_str())
    .build()
    .unwrap();

  let previous_healthiness = target.healthiness();
  let result = contact_target(uri, config.timeout).await;

  if previous_healthiness.as_ref() != &result {
    info!("new healthiness for {}: {}", target.authority(), &result);
    target.set_healthiness(result);
  }
}

async fn contact_target(target_uri: Uri, timeout: u64) -> Healthiness {
  let http_connector = HttpConnector::new();
  let mut connector = TimeoutConnector::new(http_connector);
  connector.set_connect_timeout(Some(Duration::from_millis(timeout)));
  connector.set_read_timeout(Some(Duration::from_millis(timeout)));
  connector.set_write_timeout(Some(Duration::from_millis(timeout)));
  let client = Client::builder().build::<_, hyper::Body>(connector);

  match client.get(target_uri).await {
    Ok(response) if response.status() == StatusCode::OK => Healthiness::Healthy,
    Ok(response) => Healthiness::Unresponsive(Some(response.status())),
    Err(_) => Healthiness::Unresponsive(None),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use hyper::{
    service::{make_service_fn, service_fn},
    Body, Response, Server,
  };
  use std::{
    net::SocketAddr,
    sync::atomic::{AtomicU16, Ordering},
  };

  async fn spawn_backend(status: Arc<AtomicU16>) -> SocketAddr {
    let make_service = make_service_fn(move |_| {
      let status = status.clone();
      async move {
        Ok::<_, hyper::Error>(service_fn(move |_request| {
          let status = status.clone();
          async move {
            Ok::<_, hyper::Error>(
              Response::builder()
                .status(status.load(Ordering::SeqCst))
                .body(Body::empty())
                .unwrap(),
            )
          }
        }))
      }
    });
    let server = Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(make_service);
    let address = server.local_addr();
    tokio::spawn(server);
    address
  }

  fn health_config() -> HealthConfig {
    HealthConfig {
      interval: 60,
      timeout: 500,
      path: "/health".into(),
    }
  }

  #[tokio::test]
  async fn probe_keeps_responsive_target_healthy() {
    let status = Arc::new(AtomicU16::new(200));
    let address = spawn_backend(status).await;
    let target = Target::new(address.to_string());
    let checker = HealthChecker::new(vec![target.clone()], health_config());

    checker.probe_all().await;

    assert_eq!(target.healthiness().as_ref(), &Healthiness::Healthy);
  }

  #[tokio::test]
  async fn probe_demotes_and_promotes_target() {
    let status = Arc::new(AtomicU16::new(500));
    let address = spawn_backend(status.clone()).await;
    let target = Target::new(address.to_string());
    let checker = HealthChecker::new(vec![target.clone()], health_config());

    checker.probe_all().await;
    assert_eq!(
      target.healthiness().as_ref(),
      &Healthiness::Unresponsive(Some(StatusCode::INTERNAL_SERVER_ERROR))
    );

    status.store(200, Ordering::SeqCst);
    checker.probe_all().await;
    assert_eq!(target.healthiness().as_ref(), &Healthiness::Healthy);
  }

  #[tokio::test]
  async fn probe_demotes_unreachable_target() {
    let target = Target::new("127.0.0.1:1");
    let checker = HealthChecker::new(vec![target.clone()], health_config());

    checker.probe_all().await;

    assert_eq!(target.healthiness().as_ref(), &Healthiness::Unresponsive(None));
  }

  #[tokio::test]
  async fn probe_cycle_covers_every_target() {
    let healthy_status = Arc::new(AtomicU16::new(200));
    let failing_status = Arc::new(AtomicU16::new(503));
    let healthy_address = spawn_backend(healthy_status).await;
    let failing_address = spawn_backend(failing_status).await;

    let targets = vec![
      Target::new(healthy_address.to_string()),
      Target::new(failing_address.to_string()),
      Target::new("127.0.0.1:1"),
    ];
    let checker = HealthChecker::new(targets.clone(), health_config());

    checker.probe_all().await;

    assert!(targets[0].is_healthy());
    assert!(!targets[1].is_healthy());
    assert!(!targets[2].is_healthy());
  }
}
