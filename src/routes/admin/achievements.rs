use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::achievement::{AchievementEditor, AchievementInput};
use crate::models::achievement::Achievement;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

fn view(a: &Achievement) -> Value {
    let mut v = json!(a);
    v["display_title"] = json!(a.display_title());
    v
}

// ── Achievements ───────────────────────────────────────

#[get("/achievements?<new>&<edit>")]
pub async fn achievements_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Achievements, &admin, slug, flash);
    list_page(
        backend,
        Section::Achievements,
        Entity::Achievements,
        context,
        Panel::from_query(new, edit),
        view,
    )
    .await
}

#[derive(FromForm)]
pub struct AchievementForm<'f> {
    pub edit_id: Option<String>,
    pub title: Option<String>,
    pub image: Option<TempFile<'f>>,
}

#[post("/achievements", data = "<form>")]
pub async fn achievement_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<AchievementForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Achievements, &admin, slug, None);
    let values = json!({ "title": form.title });
    let image = match read_upload_or_panel(form.image.as_ref(), &form.edit_id, &values).await {
        Ok(image) => image,
        Err(panel) => {
            return Err(list_page(
                backend,
                Section::Achievements,
                Entity::Achievements,
                context,
                Panel::Retry(panel),
                view,
            )
            .await)
        }
    };
    let input = AchievementInput {
        title: form.title.clone().unwrap_or_default(),
        image,
    };
    submit_page::<AchievementEditor, Achievement>(
        backend,
        Section::Achievements,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        view,
    )
    .await
}

#[post("/achievements/<id>/delete")]
pub async fn achievement_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Achievements, slug, Entity::Achievements, id).await
}
