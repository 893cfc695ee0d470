use std::sync::Arc;
use std::time::Duration;

use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::backend::Backend;
use crate::config::SiteConfig;
use crate::editor::message::{ContactMessageEditor, ContactMessageInput};
use crate::editor::{self, EditorError};
use crate::rate_limit::{Bucket, RateLimiter};
use crate::security::auth::ClientIp;
use crate::site::{self, HomePage};

pub const POPUP_COOKIE: &str = "deptsite_popup_dismissed";
const POPUP_DAYS: i64 = 30;
const CONTACT_WINDOW: Duration = Duration::from_secs(60 * 60);

// ── Homepage ───────────────────────────────────────────

#[get("/")]
pub async fn homepage(
    backend: &State<Backend>,
    config: &State<SiteConfig>,
    cookies: &CookieJar<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let home = match backend.run(site::build_home).await {
        Ok(home) => home,
        Err(e) => {
            log::error!("Home page data failed: {}", e);
            HomePage::default()
        }
    };

    let mut context = json!({
        "site_name": config.site.name,
        "home": home,
        "show_popup": cookies.get(POPUP_COOKIE).is_none(),
    });
    if let Some(ref f) = flash {
        context["flash_kind"] = json!(f.kind());
        context["flash_msg"] = json!(f.message());
    }
    Template::render("public/index", &context)
}

// ── Contact form ───────────────────────────────────────

#[derive(Debug, FromForm)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[post("/contact", data = "<form>")]
pub async fn contact_submit(
    form: Form<ContactForm>,
    backend: &State<Backend>,
    config: &State<SiteConfig>,
    limiter: &State<Arc<RateLimiter>>,
    client_ip: ClientIp,
) -> Flash<Redirect> {
    let to = Redirect::to("/#contact");
    let max = config.site.contact_rate_limit.max(1);
    if !limiter.check_and_record(Bucket::Contact, &client_ip.0, max, CONTACT_WINDOW) {
        log::warn!("Contact rate limit hit for {}", client_ip.0);
        return Flash::error(to, "Too many messages. Please try again later.");
    }

    let form = form.into_inner();
    let input = ContactMessageInput {
        name: form.name,
        email: form.email,
        message: form.message,
    };
    let result = backend
        .run(move |b| editor::submit::<ContactMessageEditor>(b, &input, None))
        .await
        .and_then(|r| r);
    match result {
        Ok(_) => Flash::success(
            to,
            "Thank you! Your message has been sent successfully. We will get back to you soon.",
        ),
        Err(EditorError::Validation(msg)) => Flash::error(to, msg),
        Err(e) => {
            log::error!("Contact form submission failed: {}", e);
            Flash::error(to, "Failed to send message. Please try again later.")
        }
    }
}

// ── Welcome popup ──────────────────────────────────────

#[post("/popup/dismiss")]
pub fn popup_dismiss(cookies: &CookieJar<'_>) -> Redirect {
    let mut cookie = Cookie::new(POPUP_COOKIE, "1");
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(rocket::time::Duration::days(POPUP_DAYS));
    cookies.add(cookie);
    Redirect::to("/")
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage, contact_submit, popup_dismiss]
}
