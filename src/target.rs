use crate::health::Healthiness;
use arc_swap::ArcSwap;
use std::{
  sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
  },
  time::Duration,
};

/// One backend server eligible to receive forwarded requests.
///
/// The authority (`host:port`) is the identity of a target; the counters are
/// live values read by the scheduling strategies while requests are in flight.
#[derive(Debug)]
pub struct Target {
  authority: String,
  healthiness: ArcSwap<Healthiness>,
  in_flight: AtomicUsize,
  last_response_time: AtomicU64,
}

impl Target {
  pub fn new<A: Into<String>>(authority: A) -> Arc<Target> {
    Arc::new(Target {
      authority: authority.into(),
      healthiness: ArcSwap::from_pointee(Healthiness::Healthy),
      in_flight: AtomicUsize::new(0),
      last_response_time: AtomicU64::new(0),
    })
  }

  pub fn authority(&self) -> &str {
    &self.authority
  }

  pub fn healthiness(&self) -> Arc<Healthiness> {
    self.healthiness.load_full()
  }

  pub fn set_healthiness(&self, healthiness: Healthiness) {
    self.healthiness.store(Arc::new(healthiness));
  }

  pub fn is_healthy(&self) -> bool {
    self.healthiness.load().as_ref() == &Healthiness::Healthy
  }

  /// Increments the in-flight counter and returns a guard that decrements it
  /// again when dropped, so the count settles even when forwarding fails.
  pub fn begin_request(self: &Arc<Self>) -> InFlightGuard {
    self.in_flight.fetch_add(1, Ordering::SeqCst);
    InFlightGuard { target: self.clone() }
  }

  pub fn in_flight_count(&self) -> usize {
    self.in_flight.load(Ordering::SeqCst)
  }

  pub fn record_response_time(&self, elapsed: Duration) {
    self.last_response_time.store(elapsed.as_micros() as u64, Ordering::SeqCst);
  }

  pub fn last_response_time(&self) -> Duration {
    Duration::from_micros(self.last_response_time.load(Ordering::SeqCst))
  }
}

impl PartialEq for Target {
  fn eq(&self, other: &Self) -> bool {
    self.authority == other.authority
  }
}

impl Eq for Target {}

pub struct InFlightGuard {
  target: Arc<Target>,
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self.target.in_flight.fetch_sub(1, Ordering::SeqCst);
  }
}
