use super::{LoadBalancingContext, LoadBalancingStrategy};
use crate::target::Target;
use regex::Regex;
use std::sync::Arc;

/// Session affinity by client address: the first IPv4 dotted-quad in the
/// remote address is hashed with 32-bit FNV-1a and mapped onto the healthy
/// list. The mapping is stable as long as the list length does not change.
#[derive(Debug)]
pub struct IpHash {
  ipv4_pattern: Regex,
}

impl IpHash {
  pub fn new() -> IpHash {
    IpHash {
      ipv4_pattern: Regex::new(r"\d+\.\d+\.\d+\.\d+").unwrap(),
    }
  }
}

impl LoadBalancingStrategy for IpHash {
  fn select_target<'t>(&self, context: &LoadBalancingContext, targets: &'t [Arc<Target>]) -> Option<&'t Arc<Target>> {
    if targets.is_empty() {
      return None;
    }
    // A remote address without a dotted quad (e.g. an IPv6 client) has no
    // stable bucket. Selection fails instead of hashing an empty string.
    let client_address = context.client_address.to_string();
    let ip = self.ipv4_pattern.find(&client_address)?.as_str();
    let index = fnv1a(ip) as usize % targets.len();
    Some(&targets[index])
  }
}

fn fnv1a(text: &str) -> u32 {
  const OFFSET_BASIS: u32 = 0x811c_9dc5;
  const PRIME: u32 = 16_777_619;
  text
    .bytes()
    .fold(OFFSET_BASIS, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(PRIME))
}
