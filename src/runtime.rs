//! Timer support for the bounded handshake wait
//!
//! On wasm32 this rides the browser's timer via gloo; elsewhere it
//! blocks the thread, which is what a plain test executor wants.

/// Suspend for roughly `ms` milliseconds.
#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

/// Suspend for roughly `ms` milliseconds.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(ms as u64));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_resolves() {
        let before = std::time::Instant::now();
        futures::executor::block_on(sleep_ms(10));
        assert!(before.elapsed() >= std::time::Duration::from_millis(8));
    }
}
