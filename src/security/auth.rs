use std::net::IpAddr;
use std::sync::Arc;

use rocket::http::{Cookie, CookieJar, HeaderMap, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use super::session::{SessionState, SessionStore};
use crate::config::{AuthProvider, SiteConfig};
use crate::hosted::HostedClient;

pub const SESSION_COOKIE: &str = "deptsite_session";
pub const REMEMBER_COOKIE: &str = "deptsite_remember_email";

// ── Client IP request guard ──

/// Client address used for rate limiting. Proxy headers are honoured only
/// when `site.trust_proxy_headers` is set; otherwise the socket peer is used.
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let trust_proxy = request
            .guard::<&State<SiteConfig>>()
            .await
            .succeeded()
            .map(|c| c.site.trust_proxy_headers)
            .unwrap_or(false);
        let peer = request.client_ip();
        Outcome::Success(ClientIp(resolve_client_ip(request.headers(), peer, trust_proxy)))
    }
}

fn resolve_client_ip(headers: &HeaderMap<'_>, peer: Option<IpAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        for name in ["CF-Connecting-IP", "X-Real-IP"] {
            if let Some(ip) = headers.get_one(name).and_then(parse_ip) {
                return ip.to_string();
            }
        }
        // X-Forwarded-For: client, proxy1, proxy2
        if let Some(ip) = headers
            .get_one("X-Forwarded-For")
            .and_then(|f| f.split(',').next())
            .and_then(parse_ip)
        {
            return ip.to_string();
        }
    }
    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

// ── Admin guard ──

/// Guard: a live admin session. Each request refreshes the idle timer.
pub struct AdminUser {
    pub email: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(sessions) = request.guard::<&State<Arc<SessionStore>>>().await.succeeded() else {
            return Outcome::Forward(Status::Unauthorized);
        };
        let cookies = request.cookies();
        let Some(session_id) = cookies.get_private(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Outcome::Forward(Status::Unauthorized);
        };
        match sessions.touch(&session_id) {
            SessionState::LoggedIn { email } => Outcome::Success(AdminUser { email }),
            SessionState::LoggedOut => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

// ── Credential check ──

/// How admin credentials are verified.
pub enum Authenticator {
    /// Configured email plus bcrypt hash.
    Local { email: String, password_hash: String },
    /// Password grant against the hosted service's auth endpoint.
    Hosted(Arc<HostedClient>),
}

impl Authenticator {
    pub fn from_config(config: &SiteConfig, hosted: Option<Arc<HostedClient>>) -> Result<Self, String> {
        match config.auth.provider {
            AuthProvider::Local => {
                if config.auth.admin_password_hash.trim().is_empty() {
                    log::warn!(
                        "auth.admin_password_hash is not set; admin login is disabled until one is configured"
                    );
                }
                Ok(Authenticator::Local {
                    email: config.auth.admin_email.trim().to_string(),
                    password_hash: config.auth.admin_password_hash.trim().to_string(),
                })
            }
            AuthProvider::Hosted => hosted
                .map(Authenticator::Hosted)
                .ok_or_else(|| "auth.provider = \"hosted\" needs backend.url".to_string()),
        }
    }

    /// Blocking. `Ok(false)` for wrong credentials, `Err` when the check itself failed.
    pub fn verify(&self, email: &str, password: &str) -> Result<bool, String> {
        match self {
            Authenticator::Local { email: admin, password_hash } => {
                if password_hash.is_empty() {
                    return Ok(false);
                }
                Ok(email.trim().eq_ignore_ascii_case(admin) && verify_password(password, password_hash))
            }
            Authenticator::Hosted(client) => client.sign_in(email.trim(), password),
        }
    }
}

// ── Password utilities ──

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Cookies ──

/// Private session cookie; persistent for `remember_days` when remembered,
/// otherwise it ends with the browser session.
pub fn set_session_cookie(
    cookies: &CookieJar<'_>,
    session_id: &str,
    remember_days: Option<i64>,
    secure: bool,
) {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_secure(secure);
    if let Some(days) = remember_days {
        cookie.set_max_age(rocket::time::Duration::days(days));
    }
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

/// Pre-fills the login form; cleared when "remember me" is unticked.
pub fn set_remembered_email(cookies: &CookieJar<'_>, email: Option<&str>, days: i64) {
    match email {
        Some(email) => {
            let mut cookie = Cookie::new(REMEMBER_COOKIE, email.to_string());
            cookie.set_path("/");
            cookie.set_same_site(SameSite::Lax);
            cookie.set_max_age(rocket::time::Duration::days(days));
            cookies.add(cookie);
        }
        None => cookies.remove(Cookie::from(REMEMBER_COOKIE)),
    }
}

pub fn remembered_email(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get(REMEMBER_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(hash: &str) -> Authenticator {
        Authenticator::Local {
            email: "admin@example.edu".into(),
            password_hash: hash.into(),
        }
    }

    #[test]
    fn local_credentials() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        let auth = local(&hash);
        assert_eq!(auth.verify("admin@example.edu", "s3cret"), Ok(true));
        assert_eq!(auth.verify(" Admin@Example.edu ", "s3cret"), Ok(true));
        assert_eq!(auth.verify("admin@example.edu", "wrong"), Ok(false));
        assert_eq!(auth.verify("other@example.edu", "s3cret"), Ok(false));
    }

    #[test]
    fn missing_hash_never_matches() {
        assert_eq!(local("").verify("admin@example.edu", ""), Ok(false));
    }

    fn forwarded(value: &str) -> HeaderMap<'static> {
        let mut headers = HeaderMap::new();
        headers.add_raw("X-Forwarded-For", value.to_string());
        headers
    }

    #[test]
    fn forwarded_header_ignored_without_trusted_proxy() {
        let peer: IpAddr = "203.0.113.9".parse().unwrap();
        let headers = forwarded("198.51.100.1, 10.0.0.1");
        assert_eq!(resolve_client_ip(&headers, Some(peer), false), "203.0.113.9");
        assert_eq!(resolve_client_ip(&headers, Some(peer), true), "198.51.100.1");
    }

    #[test]
    fn malformed_forwarded_value_falls_back_to_peer() {
        let peer: IpAddr = "203.0.113.9".parse().unwrap();
        let headers = forwarded("not-an-ip");
        assert_eq!(resolve_client_ip(&headers, Some(peer), true), "203.0.113.9");
        assert_eq!(resolve_client_ip(&HeaderMap::new(), None, false), "unknown");
    }

    #[test]
    fn hosted_provider_needs_client() {
        let mut config = SiteConfig::default();
        config.auth.provider = AuthProvider::Hosted;
        assert!(Authenticator::from_config(&config, None).is_err());
    }
}
