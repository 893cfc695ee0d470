use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "Site.toml";

/// Site configuration, read from `Site.toml` at startup.
/// Rocket's own settings (port, secret_key) stay in `Rocket.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub backend: BackendSection,
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    pub default_department: String,
    pub admin_slug: String,
    /// Contact form submissions allowed per client IP per hour.
    pub contact_rate_limit: u64,
    /// Take the client address from proxy headers. Only enable behind a
    /// reverse proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        SiteSection {
            name: "Department of AI & ML".to_string(),
            default_department: "AIML".to_string(),
            admin_slug: "admin".to_string(),
            contact_rate_limit: 5,
            trust_proxy_headers: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Hosted,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub kind: BackendKind,
    /// Project URL of the hosted service, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public anonymous-role key. Visible to anyone who can read the config;
    /// write access must be gated by the service's own row policies.
    pub anon_key: String,
    pub sqlite_path: String,
    pub uploads_dir: String,
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        BackendSection {
            kind: BackendKind::Sqlite,
            url: String::new(),
            anon_key: String::new(),
            sqlite_path: "website/db/deptsite.db".to_string(),
            uploads_dir: "website/uploads".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Hosted,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub provider: AuthProvider,
    pub admin_email: String,
    /// bcrypt hash; generate one with `deptsite hash-password <password>`
    pub admin_password_hash: String,
    pub idle_timeout_minutes: u64,
    pub remember_days: i64,
    pub login_rate_limit: u64,
    /// Mark session cookies `Secure`; enable when served over HTTPS.
    pub secure_cookies: bool,
}

impl Default for AuthSection {
    fn default() -> Self {
        AuthSection {
            provider: AuthProvider::Local,
            admin_email: "admin@gndecb.ac.in".to_string(),
            admin_password_hash: String::new(),
            idle_timeout_minutes: 30,
            remember_days: 30,
            login_rate_limit: 5,
            secure_cookies: false,
        }
    }
}

impl SiteConfig {
    /// Load from `$DEPTSITE_CONFIG` (or `Site.toml`), then apply env overrides.
    /// A missing file is not an error: defaults describe a local sqlite site.
    pub fn load() -> Result<Self, String> {
        let path = std::env::var("DEPTSITE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = if Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {}", path, e))?;
            Self::from_toml(&raw).map_err(|e| format!("Invalid {}: {}", path, e))?
        } else {
            log::info!("{} not found, using built-in defaults", path);
            SiteConfig::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("DEPTSITE_BACKEND_URL") {
            self.backend.url = v;
        }
        if let Some(v) = get("DEPTSITE_ANON_KEY") {
            self.backend.anon_key = v;
        }
        if let Some(v) = get("DEPTSITE_ADMIN_EMAIL") {
            self.auth.admin_email = v;
        }
        if let Some(v) = get("DEPTSITE_ADMIN_PASSWORD_HASH") {
            self.auth.admin_password_hash = v;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let needs_hosted = self.backend.kind == BackendKind::Hosted
            || self.auth.provider == AuthProvider::Hosted;
        if needs_hosted {
            if self.backend.url.trim().is_empty() {
                return Err("backend.url is required for the hosted backend".into());
            }
            if url::Url::parse(&self.backend.url).is_err() {
                return Err(format!("backend.url is not a valid URL: {}", self.backend.url));
            }
            if self.backend.anon_key.trim().is_empty() {
                return Err("backend.anon_key is required for the hosted backend".into());
            }
        }
        if self.site.admin_slug.trim_matches('/').is_empty() {
            return Err("site.admin_slug must not be empty".into());
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auth.idle_timeout_minutes.max(1) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_local_site() {
        let c = SiteConfig::default();
        assert_eq!(c.backend.kind, BackendKind::Sqlite);
        assert_eq!(c.auth.idle_timeout_minutes, 30);
        assert_eq!(c.site.default_department, "AIML");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = SiteConfig::from_toml(
            r#"
            [backend]
            kind = "hosted"
            url = "https://demo.example.co"
            anon_key = "public-key"
            "#,
        )
        .unwrap();
        assert_eq!(c.backend.kind, BackendKind::Hosted);
        assert_eq!(c.backend.uploads_dir, "website/uploads");
        assert_eq!(c.auth.provider, AuthProvider::Local);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn hosted_without_key_is_rejected() {
        let c = SiteConfig::from_toml("[backend]\nkind = \"hosted\"\nurl = \"https://x.example.co\"\n")
            .unwrap();
        assert!(c.validate().unwrap_err().contains("anon_key"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut c = SiteConfig::default();
        c.apply_env(|k| match k {
            "DEPTSITE_ADMIN_EMAIL" => Some("office@example.edu".to_string()),
            _ => None,
        });
        assert_eq!(c.auth.admin_email, "office@example.edu");
        assert!(c.backend.url.is_empty());
    }
}
