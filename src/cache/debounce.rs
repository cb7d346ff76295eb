//! Debounce gate for search input.
//!
//! Every new value re-arms the timer; only the value that survives the
//! delay without being superseded is forwarded to the fetch path. An
//! already-dispatched fetch is not canceled at the transport level; its
//! result is simply discarded at the consumption point when a newer value
//! has since been forwarded, so no cancellable transport is required.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

/// Gate that forwards only the last value of an input burst.
#[derive(Clone)]
pub struct DebounceGate {
  delay: Duration,
  generation: Arc<AtomicU64>,
}

impl DebounceGate {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      generation: Arc::new(AtomicU64::new(0)),
    }
  }

  /// Submit a new input value. Resolves to `Some(value)` only if no newer
  /// value arrives within the delay window; superseded values resolve to
  /// `None` and must not be forwarded.
  pub async fn debounce(&self, value: String) -> Option<String> {
    let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

    tokio::time::sleep(self.delay).await;

    if self.generation.load(Ordering::SeqCst) == my_generation {
      trace!(value = %value, "debounced value settled");
      Some(value)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_only_last_value_in_burst_survives() {
    let gate = DebounceGate::new(Duration::from_millis(400));

    // "fix bug" typed character by character, 50ms apart.
    let mut pending = Vec::new();
    let mut typed = String::new();
    for ch in "fix bug".chars() {
      typed.push(ch);
      pending.push(tokio::spawn({
        let gate = gate.clone();
        let value = typed.clone();
        async move { gate.debounce(value).await }
      }));
      tokio::time::sleep(Duration::from_millis(50)).await;
    }

    tokio::time::sleep(Duration::from_millis(400)).await;

    let mut forwarded = Vec::new();
    for handle in pending {
      if let Some(value) = handle.await.unwrap() {
        forwarded.push(value);
      }
    }

    assert_eq!(forwarded, vec!["fix bug".to_string()]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_value_survives_when_input_quiesces() {
    let gate = DebounceGate::new(Duration::from_millis(400));

    let result = gate.debounce("tokio".to_string()).await;
    assert_eq!(result, Some("tokio".to_string()));
  }

  #[tokio::test(start_paused = true)]
  async fn test_slow_typing_forwards_each_value() {
    let gate = DebounceGate::new(Duration::from_millis(100));

    // Gaps longer than the delay: both values settle.
    let first = tokio::spawn({
      let gate = gate.clone();
      async move { gate.debounce("a".to_string()).await }
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    let second = tokio::spawn({
      let gate = gate.clone();
      async move { gate.debounce("ab".to_string()).await }
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(first.await.unwrap(), Some("a".to_string()));
    assert_eq!(second.await.unwrap(), Some("ab".to_string()));
  }
}
