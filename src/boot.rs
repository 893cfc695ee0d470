use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::{BackendKind, SiteConfig};
use crate::media::Bucket;

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &[
    "website",
    "website/static",
    "website/static/css",
    "website/static/js",
    "website/templates",
    "website/templates/admin",
    "website/templates/public",
];

/// Critical template files; the server cannot render pages without these
const CRITICAL_TEMPLATES: &[&str] = &[
    "website/templates/admin/base.html.tera",
    "website/templates/admin/login.html.tera",
    "website/templates/admin/dashboard.html.tera",
    "website/templates/public/index.html.tera",
];

/// Critical static assets
const CRITICAL_STATIC: &[&str] = &["website/static/css/admin.css", "website/static/css/site.css"];

/// Run all boot checks. Call this before Rocket launches.
/// Creates missing directories, warns about missing files, and
/// aborts if critical dependencies are absent.
pub fn run(config: &SiteConfig) {
    info!("Boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    let mut dirs: Vec<String> = REQUIRED_DIRS.iter().map(|d| d.to_string()).collect();
    if config.backend.kind == BackendKind::Sqlite {
        if let Some(parent) = Path::new(&config.backend.sqlite_path).parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent.to_string_lossy().into_owned());
            }
        }
        for bucket in Bucket::ALL {
            dirs.push(format!("{}/{}", config.backend.uploads_dir, bucket.name()));
        }
    }
    for dir in &dirs {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        if !Path::new(file).exists() {
            error!("  MISSING critical template: {}", file);
            errors += 1;
        }
    }

    // ── 3. Critical static assets ──────────────────────
    for file in CRITICAL_STATIC {
        if !Path::new(file).exists() {
            warn!("  Missing static asset: {} (pages will be unstyled)", file);
            warnings += 1;
        }
    }

    // ── 4. Uploads directory writable ───────────────────
    if config.backend.kind == BackendKind::Sqlite {
        let uploads_dir = Path::new(&config.backend.uploads_dir);
        if uploads_dir.exists() {
            let test_file = uploads_dir.join(".write_test");
            match fs::write(&test_file, "test") {
                Ok(_) => {
                    let _ = fs::remove_file(&test_file);
                }
                Err(e) => {
                    warn!("  Uploads directory not writable: {} (file uploads will fail)", e);
                    warnings += 1;
                }
            }
        }
    }

    // ── 5. Admin credentials ────────────────────────────
    if config.auth.provider == crate::config::AuthProvider::Local
        && config.auth.admin_password_hash.trim().is_empty()
    {
        warn!("  auth.admin_password_hash is empty; run `deptsite hash-password <password>`");
        warnings += 1;
    }

    // ── 6. Rocket.toml exists ───────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found, using default config");
        warnings += 1;
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }

    if warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}
