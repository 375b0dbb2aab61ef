use super::{LoadBalancingContext, LoadBalancingStrategy};
use crate::target::Target;
use rand::{thread_rng, Rng};
use std::sync::Arc;

#[derive(Debug)]
pub struct Random {}

impl Random {
  pub fn new() -> Random {
    Random {}
  }
}

impl LoadBalancingStrategy for Random {
  fn select_target<'t>(&self, _context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>> {
    if targets.is_empty() {
      return None;
    }
    let mut rng = thread_rng();
    let index = rng.gen_range(0..targets.len());
    Some(&targets[index])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use hyper::{Body, Request};

  #[test]
  fn random_always_selects_a_listed_target() {
    let request = Request::builder().body(Body::empty()).unwrap();
    let context = LoadBalancingContext {
      client_address: &"127.0.0.1:3000".parse().unwrap(),
      request: &request,
    };
    let targets = vec![
      Target::new("127.0.0.1:1"),
      Target::new("127.0.0.1:2"),
      Target::new("127.0.0.1:3"),
    ];
    let strategy = Random::new();

    for _ in 0..100 {
      let selected = strategy.select_target(&context, &targets).unwrap();
      assert!(targets.contains(selected));
    }
  }

  #[test]
  fn random_empty_list_selects_nothing() {
    let request = Request::builder().body(Body::empty()).unwrap();
    let context = LoadBalancingContext {
      client_address: &"127.0.0.1:3000".parse().unwrap(),
      request: &request,
    };
    let strategy = Random::new();

    assert_eq!(strategy.select_target(&context, &[]), None);
  }
}
