use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{delete_redirect, list_page, page_context, read_upload_or_panel, submit_page, Panel, Section};
use crate::backend::Backend;
use crate::editor::student::{StudentEditor, StudentInput};
use crate::models::student::Student;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

// ── Students ───────────────────────────────────────────

#[get("/students?<new>&<edit>")]
pub async fn students_list(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    new: Option<&str>,
    edit: Option<&str>,
) -> Template {
    let context = page_context(Section::Students, &admin, slug, flash);
    list_page(
        backend,
        Section::Students,
        Entity::Students,
        context,
        Panel::from_query(new, edit),
        Student::view,
    )
    .await
}

#[derive(FromForm)]
pub struct StudentForm<'f> {
    pub edit_id: Option<String>,
    pub name: String,
    pub roll_number: String,
    pub year: String,
    pub semester: Option<String>,
    pub cgpa: String,
    pub is_topper: bool,
    pub photo: Option<TempFile<'f>>,
}

#[post("/students", data = "<form>")]
pub async fn student_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<StudentForm<'_>>,
) -> Result<Flash<Redirect>, Template> {
    let context = page_context(Section::Students, &admin, slug, None);
    let values = json!({
        "name": form.name,
        "roll_number": form.roll_number,
        "year": form.year,
        "semester": form.semester,
        "cgpa": form.cgpa,
        "is_topper": form.is_topper,
    });
    let photo = match read_upload_or_panel(form.photo.as_ref(), &form.edit_id, &values).await {
        Ok(photo) => photo,
        Err(panel) => {
            return Err(list_page(
                backend,
                Section::Students,
                Entity::Students,
                context,
                Panel::Retry(panel),
                Student::view,
            )
            .await)
        }
    };
    let input = StudentInput {
        name: form.name.clone(),
        roll_number: form.roll_number.clone(),
        year: form.year.clone(),
        semester: form.semester.clone().unwrap_or_default(),
        cgpa: form.cgpa.clone(),
        is_topper: form.is_topper,
        photo,
    };
    submit_page::<StudentEditor, Student>(
        backend,
        Section::Students,
        slug,
        context,
        input,
        form.edit_id.clone(),
        values,
        Student::view,
    )
    .await
}

#[post("/students/<id>/delete")]
pub async fn student_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
) -> Flash<Redirect> {
    delete_redirect(backend, Section::Students, slug, Entity::Students, id).await
}
