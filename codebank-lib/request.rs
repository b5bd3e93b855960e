//! Request ids for async work that may complete out of order.
//!
//! Every dispatched search gets a fresh id from a monotonically increasing
//! counter. The counter is bumped *before* the request suspends, so by the
//! time any completion arrives the tracker already knows whether a newer
//! request superseded it. Cancellation is purely logical: the transport keeps
//! running, its result is just never applied.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestTracker {
  current:   u64,
  in_flight: Option<u64>,
}

impl RequestTracker {
  /// Issue the id for a newly dispatched request. Any earlier request becomes
  /// stale.
  pub fn begin(&mut self) -> u64 {
    self.current = self.current.saturating_add(1);
    self.in_flight = Some(self.current);
    self.current
  }

  /// Supersede whatever is in flight without dispatching anything new.
  pub fn invalidate(&mut self) {
    self.current = self.current.saturating_add(1);
    self.in_flight = None;
  }

  /// Mark `request_id` as completed. Returns whether it was the current
  /// request, i.e. whether its result may be applied.
  pub fn finish(&mut self, request_id: u64) -> bool {
    if !self.is_current(request_id) {
      return false;
    }
    self.in_flight = None;
    true
  }

  pub fn is_current(&self, request_id: u64) -> bool {
    self.in_flight == Some(request_id)
  }

  pub fn current(&self) -> u64 {
    self.current
  }

  pub fn in_flight(&self) -> Option<u64> {
    self.in_flight
  }
}
