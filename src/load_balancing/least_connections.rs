use super::{LoadBalancingContext, LoadBalancingStrategy};
use crate::target::Target;
use std::sync::Arc;

/// Selects the target with the fewest requests currently in flight. Ties go
/// to the earliest target in the healthy list.
#[derive(Debug)]
pub struct LeastConnections {}

impl LeastConnections {
  pub fn new() -> LeastConnections {
    LeastConnections {}
  }
}

impl LoadBalancingStrategy for LeastConnections {
  fn select_target<'t>(&self, _context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>> {
    targets.iter().min_by_key(|target| target.in_flight_count())
  }
}
