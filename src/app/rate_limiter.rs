use crate::utils::time_utils::current_timestamp;

/**
 * Counts how many times the contact endpoint gets called in a
 * time window. Reaching the max locks it for "block_duration"
 * seconds, after which the counter starts over.
 */
pub struct BasicRateLimiter {
  counter: u32,
  last_update: i64,
  is_limited: bool,
  max_requests: u32,
  max_requests_time: u32,
  block_duration: u32
}

impl BasicRateLimiter {

  pub fn new(
    max_requests: u32,
    max_requests_time: u32,
    block_duration: u32
  ) -> Self {
    Self {
      counter: 0,
      last_update: current_timestamp(),
      is_limited: false,
      max_requests,
      max_requests_time,
      block_duration
    }
  }

  #[cfg(test)]
  fn is_locked(&self) -> bool {
    self.is_limited
  }

  fn is_expired_at(&self, now: i64) -> bool {
    let window = if self.is_limited
      { self.block_duration } else { self.max_requests_time };
    now - self.last_update >= window.into()
  }

  // Registers a request. Returns true if that request has to be
  // rejected.
  pub fn hit(&mut self) -> bool {
    self.hit_at(current_timestamp())
  }

  fn hit_at(&mut self, now: i64) -> bool {
    if self.is_expired_at(now) {
      self.counter = 0;
      self.last_update = now;
      self.is_limited = false;
    }
    if self.is_limited {
      return true;
    }
    self.counter += 1;
    if self.counter > self.max_requests {
      self.is_limited = true;
      self.last_update = now;
      return true;
    }
    false
  }

}
