use super::{LoadBalancingContext, LoadBalancingStrategy};
use crate::target::Target;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

#[derive(Debug)]
pub struct RoundRobin {
  cursor: AtomicUsize,
}

impl RoundRobin {
  pub fn new() -> RoundRobin {
    RoundRobin {
      cursor: AtomicUsize::new(0),
    }
  }
}

impl LoadBalancingStrategy for RoundRobin {
  fn select_target<'t>(&self, _context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>> {
    if targets.is_empty() {
      return None;
    }
    // The cursor advances by exactly one per call and wraps modulo the
    // current list length. When the healthy list shrinks between calls this
    // can skip or repeat a target for one cycle.
    let index = self.cursor.fetch_add(1, Ordering::Relaxed) % targets.len();
    Some(&targets[index])
  }
}
