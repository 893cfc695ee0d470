use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{page_context, Section};
use crate::backend::Backend;
use crate::models::stats::DashboardStats;
use crate::security::auth::AdminUser;
use crate::editor::EditorError;
use crate::store::Entity;
use crate::AdminSlug;

// ── Dashboard ──────────────────────────────────────────

#[get("/")]
pub async fn dashboard(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let stats = load_stats(backend).await;
    let mut context = page_context(Section::Dashboard, &admin, slug, flash);
    context["stats"] = json!(stats);
    context["backend_name"] = json!(backend.store.backend_name());
    Template::render(Section::Dashboard.template(), &context)
}

/// The six counts run concurrently; a failed count shows as zero.
pub async fn load_stats(backend: &Backend) -> DashboardStats {
    let (faculty, students, activities, achievements, leadership, messages) = rocket::tokio::join!(
        count_or_zero(backend, Entity::Faculty),
        count_or_zero(backend, Entity::Students),
        count_or_zero(backend, Entity::Activities),
        count_or_zero(backend, Entity::Achievements),
        count_or_zero(backend, Entity::Leadership),
        count_or_zero(backend, Entity::ContactMessages),
    );
    DashboardStats {
        faculty,
        students,
        activities,
        achievements,
        leadership,
        messages,
    }
}

async fn count_or_zero(backend: &Backend, entity: Entity) -> i64 {
    let result = backend
        .run(move |b| b.store.count(entity))
        .await
        .and_then(|r| r.map_err(EditorError::Backend));
    match result {
        Ok(n) => n,
        Err(e) => {
            log::warn!("Dashboard count for {} failed: {}", entity.table(), e);
            0
        }
    }
}
