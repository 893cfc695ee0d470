use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::faculty::{FacultyEditor, FacultyInput};
use crate::models::faculty::Faculty;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

fn view(f: &Faculty) -> Value {
    json!(f)
}

// ── Faculty ────────────────────────────────────────────

#[get("/faculty?<new>&<edit>")]
pub async fn faculty_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Faculty, &admin, slug, flash);
    list_page(backend, Section::Faculty, Entity::Faculty, context, Panel::from_query(new, edit), view).await
}

#[derive(FromForm)]
pub struct FacultyForm<'f> {
    pub edit_id: Option<String>,
    pub name: String,
    pub role: String,
    pub department: Option<String>,
    pub photo: Option<TempFile<'f>>,
}

#[post("/faculty", data = "<form>")]
pub async fn faculty_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<FacultyForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Faculty, &admin, slug, None);
    let values = json!({
        "name": form.name,
        "role": form.role,
        "department": form.department,
    });
    let photo = match read_upload_or_panel(form.photo.as_ref(), &form.edit_id, &values).await {
        Ok(photo) => photo,
        Err(panel) => {
            return Err(list_page(backend, Section::Faculty, Entity::Faculty, context, Panel::Retry(panel), view).await)
        }
    };
    let input = FacultyInput {
        name: form.name.clone(),
        role: form.role.clone(),
        department: form.department.clone().unwrap_or_default(),
        photo,
    };
    submit_page::<FacultyEditor, Faculty>(
        backend,
        Section::Faculty,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        view,
    )
    .await
}

#[post("/faculty/<id>/delete")]
pub async fn faculty_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Faculty, slug, Entity::Faculty, id).await
}
