#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket_dyn_templates::Template;

mod backend;
mod boot;
mod cache;
mod config;
mod db;
mod editor;
mod hosted;
mod listing;
mod media;
mod messages;
mod models;
mod rate_limit;
mod routes;
mod security;
mod site;
mod store;
mod tasks;

#[cfg(test)]
mod tests;

use backend::Backend;
use config::{BackendKind, SiteConfig};
use rate_limit::RateLimiter;
use security::auth::Authenticator;
use security::session::SessionStore;

/// Holds the admin URL slug, read from the site config at startup.
/// Shared via Rocket managed state so routes, fairings, and templates can access it.
pub struct AdminSlug(pub String);

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let slug = req.rocket().state::<AdminSlug>()
            .map(|s| s.0.as_str())
            .unwrap_or("admin");
        let prefix = format!("/{}", slug);
        if req.uri().path().starts_with(&*prefix) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(422)]
fn unprocessable() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>422</h1><p>The submitted form could not be read.</p><a href='javascript:history.back()'>← Back</a></body></html>".to_string())
}

/// `deptsite hash-password <password>` prints a bcrypt hash for `auth.admin_password_hash`.
fn hash_password_command(args: &[String]) -> Option<i32> {
    if args.first().map(String::as_str) != Some("hash-password") {
        return None;
    }
    let Some(password) = args.get(1) else {
        eprintln!("usage: deptsite hash-password <password>");
        return Some(2);
    };
    match security::auth::hash_password(password) {
        Ok(hash) => {
            println!("{}", hash);
            Some(0)
        }
        Err(e) => {
            eprintln!("Failed to hash password: {}", e);
            Some(1)
        }
    }
}

fn build(config: SiteConfig) -> rocket::Rocket<rocket::Build> {
    // The blocking HTTP client must be created outside the async runtime.
    let backend = Backend::from_config(&config).expect("Failed to initialize backend");
    backend
        .store
        .run_migrations()
        .expect("Failed to prepare backend tables");
    let authenticator = Authenticator::from_config(&config, backend.hosted.clone())
        .expect("Failed to configure admin authentication");

    let admin_slug = config.site.admin_slug.trim_matches('/').to_string();
    let admin_mount = format!("/{}", admin_slug);
    eprintln!("Admin panel mounted at: {}", admin_mount);

    let remember_for = std::time::Duration::from_secs(config.auth.remember_days.max(1) as u64 * 24 * 60 * 60);
    let sessions = Arc::new(SessionStore::new(config.idle_timeout(), remember_for));
    let limiter = Arc::new(RateLimiter::new());

    let mut rocket = rocket::build()
        .manage(backend)
        .manage(Arc::new(authenticator))
        .manage(Arc::clone(&sessions))
        .manage(Arc::clone(&limiter))
        .manage(AdminSlug(admin_slug))
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .attach(tasks::BackgroundTasks { sessions, limiter })
        .mount("/static", FileServer::from("website/static"));

    if config.backend.kind == BackendKind::Sqlite {
        rocket = rocket.mount("/uploads", FileServer::from(config.backend.uploads_dir.clone()));
    }

    rocket
        .manage(config)
        .mount("/", routes::public::routes())
        .mount(&admin_mount, routes::admin::routes())
        .mount(&admin_mount, routes::auth::routes())
        .register("/", catchers![not_found, server_error, unprocessable])
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(code) = hash_password_command(&args) {
        std::process::exit(code);
    }

    let config = SiteConfig::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Boot check: create directories, validate critical files
    boot::run(&config);

    let rocket = build(config);
    if let Err(e) = rocket::execute(rocket.launch()) {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
