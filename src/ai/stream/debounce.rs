use std::time::Duration;
use tokio::time::Instant;

/// Cancellable reset-on-activity timer.
///
/// `schedule` (re)arms the deadline, `cancel` disarms it, and `fired`
/// resolves once an armed deadline elapses. A disarmed timer never fires,
/// which makes `fired` safe to poll inside `tokio::select!`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm, or push an armed deadline out by a full delay
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Disarm; returns whether a deadline was pending
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait for the armed deadline, then disarm
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let mut timer = Debouncer::new(Duration::from_millis(100));
        timer.schedule();
        let start = Instant::now();
        timer.fired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(100));
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_resets_deadline() {
        let mut timer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();
        timer.schedule();
        tokio::time::advance(Duration::from_millis(60)).await;
        timer.schedule();
        timer.fired().await;
        assert_eq!(start.elapsed(), Duration::from_millis(160));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let mut timer = Debouncer::new(Duration::from_millis(100));
        timer.schedule();
        assert!(timer.cancel());
        assert!(!timer.cancel());

        let fired = tokio::time::timeout(Duration::from_secs(5), timer.fired()).await;
        assert!(fired.is_err());
    }
}
