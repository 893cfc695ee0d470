use std::sync::Arc;
use std::time::Duration;

use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::rate_limit::{Bucket, RateLimiter};
use crate::security::auth::{self, AdminUser, Authenticator, ClientIp, SESSION_COOKIE};
use crate::security::session::SessionStore;
use crate::AdminSlug;

const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Serialize)]
struct LoginContext {
    admin_slug: String,
    site_name: String,
    email: String,
    remember: bool,
    error: Option<String>,
    flash_msg: Option<String>,
}

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

#[get("/login")]
pub fn login_page(
    admin: Option<AdminUser>,
    config: &State<SiteConfig>,
    admin_slug: &State<AdminSlug>,
    cookies: &CookieJar<'_>,
    flash: Option<rocket::request::FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    if admin.is_some() {
        return Err(Redirect::to(format!("/{}", admin_slug.0)));
    }
    let remembered = auth::remembered_email(cookies);
    let ctx = LoginContext {
        admin_slug: admin_slug.0.clone(),
        site_name: config.site.name.clone(),
        remember: remembered.is_some(),
        email: remembered.unwrap_or_default(),
        error: None,
        flash_msg: flash.map(|f| f.message().to_string()),
    };
    Ok(Template::render("admin/login", &ctx))
}

#[post("/login", data = "<form>")]
pub async fn login_submit(
    form: Form<LoginForm>,
    config: &State<SiteConfig>,
    authenticator: &State<Arc<Authenticator>>,
    sessions: &State<Arc<SessionStore>>,
    limiter: &State<Arc<RateLimiter>>,
    admin_slug: &State<AdminSlug>,
    client_ip: ClientIp,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Template> {
    let form = form.into_inner();
    let make_err = |msg: &str| {
        let ctx = LoginContext {
            admin_slug: admin_slug.0.clone(),
            site_name: config.site.name.clone(),
            email: form.email.clone(),
            remember: form.remember,
            error: Some(msg.to_string()),
            flash_msg: None,
        };
        Template::render("admin/login", &ctx)
    };

    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Err(make_err("Please fill in all fields"));
    }

    // Check rate limit before processing
    let max_attempts = config.auth.login_rate_limit.max(1);
    if !limiter.check_and_record(Bucket::Login, &client_ip.0, max_attempts, LOGIN_WINDOW) {
        log::warn!("Login rate limit hit for {}", client_ip.0);
        return Err(make_err("Too many login attempts. Please try again in 15 minutes."));
    }

    let checker = Arc::clone(authenticator.inner());
    let (who, password) = (email.clone(), form.password.clone());
    let verified = rocket::tokio::task::spawn_blocking(move || checker.verify(&who, &password)).await;
    match verified {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            log::warn!("Failed admin login for {} from {}", email, client_ip.0);
            return Err(make_err("Invalid email or password"));
        }
        Ok(Err(e)) => {
            log::error!("Admin login check failed: {}", e);
            return Err(make_err(&format!("Login failed: {}", e)));
        }
        Err(e) => {
            log::error!("Admin login task failed: {}", e);
            return Err(make_err("Login failed. Please try again."));
        }
    }

    let session_id = sessions.create(&email, form.remember);
    let remember_days = form.remember.then_some(config.auth.remember_days);
    auth::set_session_cookie(cookies, &session_id, remember_days, config.auth.secure_cookies);
    auth::set_remembered_email(
        cookies,
        form.remember.then_some(email.as_str()),
        config.auth.remember_days,
    );
    limiter.reset(Bucket::Login, &client_ip.0);
    log::info!("Admin {} logged in", email);
    Ok(Redirect::to(format!("/{}", admin_slug.0)))
}

#[post("/logout")]
pub fn logout(
    sessions: &State<Arc<SessionStore>>,
    admin_slug: &State<AdminSlug>,
    cookies: &CookieJar<'_>,
) -> Flash<Redirect> {
    if let Some(cookie) = cookies.get_private(SESSION_COOKIE) {
        sessions.destroy(cookie.value());
    }
    auth::clear_session_cookie(cookies);
    Flash::success(
        Redirect::to(format!("/{}/login", admin_slug.0)),
        "You have been logged out.",
    )
}

/// Catch-all for any /<admin_slug>/* route that failed the AdminUser guard.
/// This fires when the guard returns Forward(Unauthorized).
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: std::path::PathBuf, admin_slug: &State<AdminSlug>) -> Redirect {
    Redirect::to(format!("/{}/login", admin_slug.0))
}

/// Same for form posts, e.g. a save submitted after the session timed out.
#[post("/<_path..>", rank = 99)]
pub fn admin_post_redirect_to_login(_path: std::path::PathBuf, admin_slug: &State<AdminSlug>) -> Flash<Redirect> {
    Flash::error(
        Redirect::to(format!("/{}/login", admin_slug.0)),
        "Your session has expired. Please log in again.",
    )
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login_page,
        login_submit,
        logout,
        admin_redirect_to_login,
        admin_post_redirect_to_login,
    ]
}
