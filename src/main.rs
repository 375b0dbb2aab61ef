use crate::{balancer::Balancer, configuration::Configuration};
use clap::{App, Arg};
use std::{io, sync::Arc, time::Duration};

mod balancer;
mod configuration;
mod error_response;
mod health;
mod load_balancing;
mod logging;
mod proxy;
mod server;
mod target;

#[tokio::main]
pub async fn main() -> Result<(), io::Error> {
  logging::initialize();

  let matches = App::new("replica-balancer")
    .about("Reverse proxying load balancer with pluggable scheduling and periodic health checks")
    .arg(
      Arg::new("config")
        .short('c')
        .long("config")
        .takes_value(true)
        .default_value("config.toml")
        .help("Path to the TOML configuration file"),
    )
    .get_matches();

  // the config argument carries a default value
  let config_path = matches.value_of("config").unwrap();
  let configuration = Configuration::read(config_path)?;
  let targets = configuration.parse_targets()?;

  let balancer = Arc::new(Balancer::new(
    configuration.strategy.into(),
    targets,
    configuration.health,
    Duration::from_millis(configuration.request_timeout),
  ));

  server::create(configuration.listen_address, balancer).await
}
