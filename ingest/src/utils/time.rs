use rand::Rng;
use std::time::Duration;

/// Sleeps for the base delay plus a random jitter, so retry storms from
/// parallel uploads do not line up.
pub async fn sleep_with_jitter(base_ms: u64, jitter_ms: u64) {
    let jitter = if jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=jitter_ms)
    };
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}
