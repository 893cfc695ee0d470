use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{page_context, Section};
use crate::backend::Backend;
use crate::editor::content::{ContentEditor, ContentInput};
use crate::editor::{self, EditorError};
use crate::models::content::SiteContent;
use crate::security::auth::AdminUser;
use crate::store::{fetch_single, Entity};
use crate::AdminSlug;

// ── Site content ───────────────────────────────────────

#[get("/content")]
pub async fn content_page(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = page_context(Section::Content, &admin, slug, flash);
    let loaded = backend
        .run(|b| fetch_single::<SiteContent>(b.store.as_ref(), Entity::Content))
        .await
        .and_then(|r| r.map_err(EditorError::Backend));
    match loaded {
        Ok(content) => render(context, json!(content.unwrap_or_default()), None),
        Err(e) => {
            log::error!("Error loading content: {}", e);
            render(context, json!(SiteContent::default()), Some(format!("Error loading content: {}", e)))
        }
    }
}

#[derive(FromForm)]
pub struct ContentForm {
    pub tagline: String,
    pub description: String,
    pub vision: String,
    pub mission: String,
}

#[post("/content", data = "<form>")]
pub async fn content_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<ContentForm>,
) -> Result<Flash<Redirect>, Template> {
    let form = form.into_inner();
    let values = json!({
        "tagline": form.tagline,
        "description": form.description,
        "vision": form.vision,
        "mission": form.mission,
    });
    let input = ContentInput {
        tagline: form.tagline,
        description: form.description,
        vision: form.vision,
        mission: form.mission,
    };
    let result = backend
        .run(move |b| editor::submit::<ContentEditor>(b, &input, None))
        .await
        .and_then(|r| r);
    match result {
        Ok(_) => Ok(Flash::success(
            Redirect::to(Section::Content.url(slug)),
            "Content saved successfully!",
        )),
        Err(e) => {
            let context = page_context(Section::Content, &admin, slug, None);
            Err(render(context, values, Some(e.to_string())))
        }
    }
}

fn render(mut context: Value, content: Value, error: Option<String>) -> Template {
    context["content"] = content;
    context["form_error"] = json!(error);
    Template::render(Section::Content.template(), &context)
}
