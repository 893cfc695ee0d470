use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{page_context, Section};
use crate::backend::Backend;
use crate::editor::contact::{ContactInfoEditor, ContactInfoInput};
use crate::editor::{self, EditorError};
use crate::messages;
use crate::models::contact::ContactInfo;
use crate::models::message::{ContactMessage, MessageFilter, MessageStatus};
use crate::security::auth::AdminUser;
use crate::store::{fetch_single, Entity};
use crate::AdminSlug;

/// Contact page url keeping the active filter and, optionally, the open message.
fn contact_url(slug: &AdminSlug, filter: MessageFilter, view: Option<&str>) -> String {
    let mut url = format!("{}?filter={}", Section::Contact.url(slug), filter.as_str());
    if let Some(id) = view {
        url.push_str("&view=");
        url.push_str(&urlencode(id));
    }
    url
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn message_view(m: &ContactMessage) -> Value {
    let mut v = json!(m);
    v["preview"] = json!(m.preview());
    v["status_label"] = json!(m.status.label());
    v
}

// ── Contact info + messages ────────────────────────────

#[get("/contact?<filter>&<view>")]
pub async fn contact_page(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    flash: Option<FlashMessage<'_>>,
    filter: Option<&str>,
    view: Option<&str>,
) -> Template {
    let context = page_context(Section::Contact, &admin, slug, flash);
    let filter = MessageFilter::parse(filter);
    render(backend, context, filter, view.map(str::to_string), None, None).await
}

async fn render(
    backend: &Backend,
    mut context: Value,
    filter: MessageFilter,
    view: Option<String>,
    info_override: Option<Value>,
    info_error: Option<String>,
) -> Template {
    let loaded = backend
        .run(move |b| {
            let info = fetch_single::<ContactInfo>(b.store.as_ref(), Entity::ContactInfo);
            let listing = messages::list(b, filter);
            let items: Vec<Value> = listing.typed::<ContactMessage>().iter().map(message_view).collect();
            let detail = view.as_deref().map(|id| messages::get(b, id));
            (info, items, listing.error, detail)
        })
        .await;

    let (info, items, load_error, detail) = match loaded {
        Ok(parts) => parts,
        Err(e) => (Err(e.to_string()), Vec::new(), Some(e.to_string()), None),
    };

    let info = match (info_override, info) {
        (Some(values), _) => values,
        (None, Ok(info)) => json!(info.unwrap_or_default()),
        (None, Err(e)) => {
            log::error!("Error loading contact info: {}", e);
            context["info_load_error"] = json!(format!("Error loading contact info: {}", e));
            json!(ContactInfo::default())
        }
    };
    context["info"] = info;
    context["info_error"] = json!(info_error);
    context["items"] = json!(items);
    context["load_error"] = json!(load_error);
    context["filter"] = json!(filter.as_str());
    context["filters"] = json!(std::iter::once(json!({ "key": "all", "label": "All" }))
        .chain(
            MessageStatus::ALL
                .iter()
                .map(|s| json!({ "key": s.as_str(), "label": s.label() }))
        )
        .collect::<Vec<_>>());
    match detail {
        Some(Ok(message)) => context["message"] = message_view(&message),
        Some(Err(e)) => context["message_error"] = json!(e.to_string()),
        None => {}
    }
    Template::render(Section::Contact.template(), &context)
}

#[derive(FromForm)]
pub struct ContactInfoForm {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub alternate_email: String,
    pub website: String,
    pub office_hours: String,
}

#[post("/contact/info", data = "<form>")]
pub async fn contact_info_save(
    admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    form: Form<ContactInfoForm>,
) -> Result<Flash<Redirect>, Template> {
    let form = form.into_inner();
    let values = json!({
        "address": form.address,
        "phone": form.phone,
        "email": form.email,
        "alternate_email": form.alternate_email,
        "website": form.website,
        "office_hours": form.office_hours,
    });
    let input = ContactInfoInput {
        address: form.address,
        phone: form.phone,
        email: form.email,
        alternate_email: form.alternate_email,
        website: form.website,
        office_hours: form.office_hours,
    };
    let result = backend
        .run(move |b| editor::submit::<ContactInfoEditor>(b, &input, None))
        .await
        .and_then(|r| r);
    match result {
        Ok(_) => Ok(Flash::success(
            Redirect::to(Section::Contact.url(slug)),
            "Contact info saved successfully!",
        )),
        Err(e) => {
            let context = page_context(Section::Contact, &admin, slug, None);
            Err(render(backend, context, MessageFilter::All, None, Some(values), Some(e.to_string())).await)
        }
    }
}

/// Run a message action and redirect back to the list with a flash.
async fn message_action<F>(
    backend: &Backend,
    slug: &AdminSlug,
    filter: Option<&str>,
    stay_on: Option<&str>,
    success: &str,
    f: F,
) -> Flash<Redirect>
where
    F: FnOnce(&Backend) -> Result<(), EditorError> + Send + 'static,
{
    let filter = MessageFilter::parse(filter);
    let result = backend.run(f).await.and_then(|r| r);
    match result {
        Ok(()) => Flash::success(Redirect::to(contact_url(slug, filter, stay_on)), success.to_string()),
        Err(e) => Flash::error(Redirect::to(contact_url(slug, filter, stay_on)), format!("Error: {}", e)),
    }
}

#[post("/contact/messages/<id>/read?<filter>")]
pub async fn message_read(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
    filter: Option<&str>,
) -> Flash<Redirect> {
    message_action(backend, slug, filter, None, "Message marked as read!", move |b| {
        messages::mark_read(b, &id).map(|_| ())
    })
    .await
}

#[post("/contact/messages/<id>/replied?<filter>")]
pub async fn message_replied(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
    filter: Option<&str>,
) -> Flash<Redirect> {
    message_action(backend, slug, filter, None, "Message marked as replied!", move |b| {
        messages::mark_replied(b, &id).map(|_| ())
    })
    .await
}

#[derive(FromForm)]
pub struct ArchiveForm {
    pub confirm: bool,
}

#[post("/contact/messages/<id>/archive?<filter>", data = "<form>")]
pub async fn message_archive(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
    filter: Option<&str>,
    form: Form<ArchiveForm>,
) -> Flash<Redirect> {
    let confirmed = form.confirm;
    if !confirmed {
        // nothing to do; reopen the message
        let filter = MessageFilter::parse(filter);
        return Flash::warning(
            Redirect::to(contact_url(slug, filter, Some(&id))),
            "Please confirm that this message should be archived.",
        );
    }
    message_action(backend, slug, filter, None, "Message archived!", move |b| {
        messages::archive(b, &id, confirmed).map(|_| ())
    })
    .await
}

#[derive(FromForm)]
pub struct NotesForm {
    pub admin_notes: String,
}

#[post("/contact/messages/<id>/notes?<filter>", data = "<form>")]
pub async fn message_notes(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
    filter: Option<&str>,
    form: Form<NotesForm>,
) -> Flash<Redirect> {
    let notes = form.into_inner().admin_notes;
    let view = id.clone();
    message_action(backend, slug, filter, Some(&view), "Notes saved!", move |b| {
        messages::save_notes(b, &id, &notes)
    })
    .await
}

#[post("/contact/messages/<id>/delete?<filter>")]
pub async fn message_delete(
    _admin: AdminUser,
    backend: &State<Backend>,
    slug: &State<AdminSlug>,
    id: String,
    filter: Option<&str>,
) -> Flash<Redirect> {
    let filter_param = MessageFilter::parse(filter);
    let result = backend
        .run(move |b| messages::delete(b, &id))
        .await
        .and_then(|r| r);
    let to = Redirect::to(contact_url(slug, filter_param, None));
    match result {
        Ok(()) => Flash::success(to, "Message deleted successfully!"),
        Err(e) => Flash::error(to, e.to_string()),
    }
}
