use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// What is being limited; each has its own attempt log per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Login,
    Contact,
}

/// In-memory sliding-window limiter keyed by (bucket, client ip).
pub struct RateLimiter {
    entries: Mutex<HashMap<(Bucket, String), Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(Bucket, String), Vec<Instant>>> {
        // a poisoned map only holds timestamps
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an attempt; `false` when `max_attempts` were already made within `window`.
    pub fn check_and_record(&self, bucket: Bucket, ip: &str, max_attempts: u64, window: Duration) -> bool {
        self.check_at(bucket, ip, max_attempts, window, Instant::now())
    }

    fn check_at(&self, bucket: Bucket, ip: &str, max_attempts: u64, window: Duration, now: Instant) -> bool {
        let mut map = self.lock();
        let attempts = map.entry((bucket, ip.to_string())).or_default();
        attempts.retain(|t| now.duration_since(*t) < window);

        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Forget a client's attempts, e.g. after a successful login.
    pub fn reset(&self, bucket: Bucket, ip: &str) {
        self.lock().remove(&(bucket, ip.to_string()));
    }

    /// Drop attempt logs older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.lock().retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < max_age);
            !attempts.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_bucket_and_ip() {
        let rl = RateLimiter::new();
        let w = Duration::from_secs(900);
        for _ in 0..3 {
            assert!(rl.check_and_record(Bucket::Login, "1.2.3.4", 3, w));
        }
        assert!(!rl.check_and_record(Bucket::Login, "1.2.3.4", 3, w));
        assert!(rl.check_and_record(Bucket::Login, "5.6.7.8", 3, w));
        assert!(rl.check_and_record(Bucket::Contact, "1.2.3.4", 3, w));
        rl.reset(Bucket::Login, "1.2.3.4");
        assert!(rl.check_and_record(Bucket::Login, "1.2.3.4", 3, w));
    }

    #[test]
    fn window_slides() {
        let rl = RateLimiter::new();
        let w = Duration::from_secs(60);
        let start = Instant::now();
        assert!(rl.check_at(Bucket::Contact, "ip", 1, w, start));
        assert!(!rl.check_at(Bucket::Contact, "ip", 1, w, start + Duration::from_secs(30)));
        assert!(rl.check_at(Bucket::Contact, "ip", 1, w, start + Duration::from_secs(61)));
    }
}
