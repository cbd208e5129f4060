use crate::utils::time::sleep_with_jitter;
use std::future::Future;

pub async fn retry_with_backoff<T, F, Fut>(
    mut retries: u32,
    base_delay_ms: u64,
    operation: F,
) -> common::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = common::Result<T>>,
{
    let mut delay = base_delay_ms;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if retries == 0 {
                    return Err(e);
                }

                retries -= 1;
                sleep_with_jitter(delay, delay / 2).await;
                delay *= 2;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, common::Error>(42) }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_surfaces_the_last_error() {
        let calls = AtomicU32::new(0);
        let result: common::Result<()> = retry_with_backoff(2, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(common::Error::Other("still down".to_string())) }
        })
        .await;
        assert!(result.is_err());
        // Initial attempt plus two retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, 1, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(common::Error::Other("flaky".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
    }
}
