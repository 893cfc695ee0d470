use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::gallery::{GalleryEditor, GalleryInput};
use crate::models::gallery::GalleryImage;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

fn view(g: &GalleryImage) -> Value {
    json!(g)
}

// ── Gallery ────────────────────────────────────────────

#[get("/gallery?<new>&<edit>")]
pub async fn gallery_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Gallery, &admin, slug, flash);
    list_page(backend, Section::Gallery, Entity::Gallery, context, Panel::from_query(new, edit), view).await
}

#[derive(FromForm)]
pub struct GalleryForm<'f> {
    pub edit_id: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub image: Option<TempFile<'f>>,
}

#[post("/gallery", data = "<form>")]
pub async fn gallery_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<GalleryForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Gallery, &admin, slug, None);
    let values = json!({ "caption": form.caption, "description": form.description });
    let image = match read_upload_or_panel(form.image.as_ref(), &form.edit_id, &values).await {
        Ok(image) => image,
        Err(panel) => {
            return Err(list_page(backend, Section::Gallery, Entity::Gallery, context, Panel::Retry(panel), view).await)
        }
    };
    let input = GalleryInput {
        caption: form.caption.clone().unwrap_or_default(),
        description: form.description.clone().unwrap_or_default(),
        image,
    };
    submit_page::<GalleryEditor, GalleryImage>(
        backend,
        Section::Gallery,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        view,
    )
    .await
}

#[post("/gallery/<id>/delete")]
pub async fn gallery_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Gallery, slug, Entity::Gallery, id).await
}
