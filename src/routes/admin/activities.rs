use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::activity::{ActivityEditor, ActivityInput};
use crate::models::activity::Activity;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

fn view(a: &Activity) -> Value {
    json!(a)
}

// ── Activities ─────────────────────────────────────────

#[get("/activities?<new>&<edit>")]
pub async fn activities_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Activities, &admin, slug, flash);
    list_page(backend, Section::Activities, Entity::Activities, context, Panel::from_query(new, edit), view).await
}

#[derive(FromForm)]
pub struct ActivityForm<'f> {
    pub edit_id: Option<String>,
    pub title: String,
    pub description: String,
    pub image: Option<TempFile<'f>>,
}

#[post("/activities", data = "<form>")]
pub async fn activity_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<ActivityForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Activities, &admin, slug, None);
    let values = json!({ "title": form.title, "description": form.description });
    let image = match read_upload_or_panel(form.image.as_ref(), &form.edit_id, &values).await {
        Ok(image) => image,
        Err(panel) => {
            return Err(list_page(backend, Section::Activities, Entity::Activities, context, Panel::Retry(panel), view).await)
        }
    };
    let input = ActivityInput {
        title: form.title.clone(),
        description: form.description.clone(),
        image,
    };
    submit_page::<ActivityEditor, Activity>(
        backend,
        Section::Activities,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        view,
    )
    .await
}

#[post("/activities/<id>/delete")]
pub async fn activity_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Activities, slug, Entity::Activities, id).await
}
