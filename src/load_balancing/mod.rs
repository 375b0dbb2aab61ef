use crate::target::Target;
use hyper::{Body, Request};
use std::{net::SocketAddr, sync::Arc};

pub mod ip_hash;
pub mod least_connections;
pub mod least_response_time;
pub mod random;
pub mod round_robin;

pub struct LoadBalancingContext<'l> {
  pub client_address: &'l SocketAddr,
  pub request: &'l Request<Body>,
}

/// Picks one target per request from the current healthy subset.
///
/// An empty `targets` slice yields `None`; the caller answers with a service
/// unavailable response in that case. Strategies touch nothing but their own
/// internal counters.
pub trait LoadBalancingStrategy: Send + Sync + std::fmt::Debug {
  fn select_target<'t>(&self, context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>>;
}
