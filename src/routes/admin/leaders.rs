use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::leader::{LeaderEditor, LeaderInput};
use crate::models::leader::Leader;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

fn view(l: &Leader) -> Value {
    json!(l)
}

// ── Leadership ─────────────────────────────────────────

#[get("/leaders?<new>&<edit>")]
pub async fn leaders_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Leaders, &admin, slug, flash);
    list_page(backend, Section::Leaders, Entity::Leadership, context, Panel::from_query(new, edit), view).await
}

#[derive(FromForm)]
pub struct LeaderForm<'f> {
    pub edit_id: Option<String>,
    pub name: String,
    pub position: String,
    pub display_order: Option<String>,
    pub photo: Option<TempFile<'f>>,
}

#[post("/leaders", data = "<form>")]
pub async fn leader_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<LeaderForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Leaders, &admin, slug, None);
    let values = json!({
        "name": form.name,
        "position": form.position,
        "display_order": form.display_order,
    });
    let photo = match read_upload_or_panel(form.photo.as_ref(), &form.edit_id, &values).await {
        Ok(photo) => photo,
        Err(panel) => {
            return Err(list_page(backend, Section::Leaders, Entity::Leadership, context, Panel::Retry(panel), view).await)
        }
    };
    let input = LeaderInput {
        name: form.name.clone(),
        position: form.position.clone(),
        display_order: form.display_order.clone().unwrap_or_default(),
        photo,
    };
    submit_page::<LeaderEditor, Leader>(
        backend,
        Section::Leaders,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        view,
    )
    .await
}

#[post("/leaders/<id>/delete")]
pub async fn leader_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Leaders, slug, Entity::Leadership, id).await
}
