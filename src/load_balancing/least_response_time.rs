use super::{LoadBalancingContext, LoadBalancingStrategy};
use crate::target::Target;
use std::sync::Arc;

/// Selects the target with the lowest last observed response time. The
/// balancer records the latency after every completed forward; ties go to the
/// earliest target in the healthy list.
#[derive(Debug)]
pub struct LeastResponseTime {}

impl LeastResponseTime {
  pub fn new() -> LeastResponseTime {
    LeastResponseTime {}
  }
}

impl LoadBalancingStrategy for LeastResponseTime {
  fn select_target<'t>(&self, _context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>> {
    targets.iter().min_by_key(|target| target.last_response_time())
  }
}
