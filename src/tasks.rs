use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::RateLimiter;
use crate::security::session::SessionStore;

const SESSION_SWEEP: Duration = Duration::from_secs(5 * 60);
const RATE_LIMIT_SWEEP: Duration = Duration::from_secs(15 * 60);
/// Longest rate-limit window in use (the contact form's hour).
const RATE_LIMIT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Periodic housekeeping for the in-memory session and rate-limit tables.
pub struct BackgroundTasks {
    pub sessions: Arc<SessionStore>,
    pub limiter: Arc<RateLimiter>,
}

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, _rocket: &Rocket<Orbit>) {
        // Session cleanup task
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(SESSION_SWEEP).await;
                let count = sessions.purge_idle();
                if count > 0 {
                    log::info!("[task] Cleaned up {} expired sessions", count);
                }
            }
        });

        // Rate limiter cleanup task
        let limiter = Arc::clone(&self.limiter);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(RATE_LIMIT_SWEEP).await;
                limiter.cleanup(RATE_LIMIT_MAX_AGE);
            }
        });

        log::info!("[task] Background tasks started");
    }
}
