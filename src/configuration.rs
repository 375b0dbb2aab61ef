use crate::{
  health::HealthConfig,
  load_balancing::{
    ip_hash::IpHash, least_connections::LeastConnections, least_response_time::LeastResponseTime, random::Random,
    round_robin::RoundRobin, LoadBalancingStrategy,
  },
  target::Target,
};
use log::{info, warn};
use serde::Deserialize;
use std::{fs, io, net::SocketAddr, sync::Arc};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct Configuration {
  pub listen_address: SocketAddr,
  pub strategy: StrategyConfig,
  pub targets: Vec<String>,
  /// Milliseconds granted to a single forwarded request.
  #[serde(default = "default_request_timeout")]
  pub request_timeout: u64,
  pub health: HealthConfig,
}

fn default_request_timeout() -> u64 {
  30_000
}

impl Configuration {
  pub fn read(toml_path: &str) -> Result<Configuration, io::Error> {
    let toml_str = fs::read_to_string(toml_path)?;
    let configuration: Configuration =
      toml::from_str(&toml_str).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    info!("Successfully parsed configuration!");
    configuration.print_warnings();
    Ok(configuration)
  }

  fn print_warnings(&self) {
    if self.targets.is_empty() {
      warn!("no targets are configured. Every request will result in a service unavailable error.");
    }
  }

  pub fn parse_targets(&self) -> Result<Vec<Arc<Target>>, io::Error> {
    self.targets.iter().map(|address| parse_target(address)).collect()
  }
}

fn parse_target(address: &str) -> Result<Arc<Target>, io::Error> {
  let invalid = |message: String| io::Error::new(io::ErrorKind::InvalidData, message);

  let url = Url::parse(address).map_err(|e| invalid(format!("invalid target address {}: {}", address, e)))?;
  if url.scheme() != "http" {
    return Err(invalid(format!("target address {} must use the http scheme", address)));
  }
  let host = url
    .host_str()
    .ok_or_else(|| invalid(format!("target address {} is missing a host", address)))?;
  let port = url.port_or_known_default().unwrap_or(80);

  Ok(Target::new(format!("{}:{}", host, port)))
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub enum StrategyConfig {
  RoundRobin,
  Random,
  IpHash,
  LeastConnections,
  LeastResponseTime,
}

impl From<StrategyConfig> for Box<dyn LoadBalancingStrategy> {
  fn from(other: StrategyConfig) -> Self {
    match other {
      StrategyConfig::RoundRobin => Box::new(RoundRobin::new()),
      StrategyConfig::Random => Box::new(Random::new()),
      StrategyConfig::IpHash => Box::new(IpHash::new()),
      StrategyConfig::LeastConnections => Box::new(LeastConnections::new()),
      StrategyConfig::LeastResponseTime => Box::new(LeastResponseTime::new()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_full_configuration() {
    let toml_str = r#"
      listen_address = "0.0.0.0:3000"
      strategy = "LeastConnections"
      targets = ["http://127.0.0.1:8084", "http://127.0.0.1:8085"]
      request_timeout = 5000

      [health]
      interval = 10
      timeout = 500
      path = "/health"
    "#;

    let configuration: Configuration = toml::from_str(toml_str).unwrap();

    assert_eq!(configuration.listen_address, "0.0.0.0:3000".parse().unwrap());
    assert_eq!(configuration.strategy, StrategyConfig::LeastConnections);
    assert_eq!(configuration.request_timeout, 5000);
    assert_eq!(
      configuration.health,
      HealthConfig {
        interval: 10,
        timeout: 500,
        path: "/health".into(),
      }
    );

    let targets = configuration.parse_targets().unwrap();
    assert_eq!(targets[0].authority(), "127.0.0.1:8084");
    assert_eq!(targets[1].authority(), "127.0.0.1:8085");
  }

  #[test]
  fn request_timeout_defaults_when_absent() {
    let toml_str = r#"
      listen_address = "0.0.0.0:3000"
      strategy = "RoundRobin"
      targets = []

      [health]
      interval = 10
      timeout = 500
      path = "/health"
    "#;

    let configuration: Configuration = toml::from_str(toml_str).unwrap();

    assert_eq!(configuration.request_timeout, 30_000);
  }

  #[test]
  fn target_port_defaults_to_http() {
    let target = parse_target("http://backend.localhost").unwrap();

    assert_eq!(target.authority(), "backend.localhost:80");
  }

  #[test]
  fn rejects_a_non_http_target() {
    assert!(parse_target("https://127.0.0.1:8084").is_err());
  }

  #[test]
  fn rejects_a_malformed_target() {
    assert!(parse_target("not an address").is_err());
  }
}
