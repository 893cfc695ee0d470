use rocket::fs::TempFile;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::tokio::io::AsyncReadExt;
use rocket_dyn_templates::Template;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::editor::{self, EditorError, RecordEditor, Saved};
use crate::listing;
use crate::media::Upload;
use crate::security::auth::AdminUser;
use crate::store::Entity;
use crate::AdminSlug;

pub mod achievements;
pub mod activities;
pub mod contact;
pub mod content;
pub mod dashboard;
pub mod faculty;
pub mod gallery;
pub mod leaders;
pub mod students;

/// Helper: get the admin base path from managed state
pub(crate) fn admin_base(slug: &AdminSlug) -> String {
    format!("/{}", slug.0)
}

// ── Navigation ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dashboard,
    Leaders,
    Faculty,
    Students,
    Activities,
    Achievements,
    Gallery,
    Content,
    Contact,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Dashboard,
        Section::Leaders,
        Section::Faculty,
        Section::Students,
        Section::Activities,
        Section::Achievements,
        Section::Gallery,
        Section::Content,
        Section::Contact,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Section::Dashboard => "",
            Section::Leaders => "leaders",
            Section::Faculty => "faculty",
            Section::Students => "students",
            Section::Activities => "activities",
            Section::Achievements => "achievements",
            Section::Gallery => "gallery",
            Section::Content => "content",
            Section::Contact => "contact",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Leaders => "Leadership Management",
            Section::Faculty => "Faculty Management",
            Section::Students => "Student Management",
            Section::Activities => "Activities Management",
            Section::Achievements => "Achievements Management",
            Section::Gallery => "Gallery Management",
            Section::Content => "Content Management",
            Section::Contact => "Contact Management",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Section::Dashboard => "admin/dashboard",
            Section::Leaders => "admin/leaders",
            Section::Faculty => "admin/faculty",
            Section::Students => "admin/students",
            Section::Activities => "admin/activities",
            Section::Achievements => "admin/achievements",
            Section::Gallery => "admin/gallery",
            Section::Content => "admin/content",
            Section::Contact => "admin/contact",
        }
    }

    pub fn url(self, slug: &AdminSlug) -> String {
        match self.slug() {
            "" => admin_base(slug),
            s => format!("{}/{}", admin_base(slug), s),
        }
    }

    fn nav(slug: &AdminSlug) -> Vec<Value> {
        Section::ALL
            .iter()
            .map(|s| json!({ "key": s, "title": s.title(), "url": s.url(slug) }))
            .collect()
    }
}

/// Base context shared by every admin page.
pub(crate) fn page_context(
    section: Section,
    admin: &AdminUser,
    slug: &AdminSlug,
    flash: Option<FlashMessage<'_>>,
) -> Value {
    let mut context = json!({
        "page_title": section.title(),
        "section": section,
        "nav": Section::nav(slug),
        "admin_slug": slug.0,
        "admin_email": admin.email,
        "base_url": section.url(slug),
    });
    if let Some(ref f) = flash {
        context["flash_kind"] = json!(f.kind());
        context["flash_msg"] = json!(f.message());
    }
    context
}

// ── Editor panel ───────────────────────────────────────

/// The open create/edit form on a list page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct EditorPanel {
    pub edit_id: Option<String>,
    pub values: Value,
    pub error: Option<String>,
}

/// Which editor panel a list page should show.
pub(crate) enum Panel {
    Closed,
    New,
    Edit(String),
    Retry(EditorPanel),
}

impl Panel {
    pub(crate) fn from_query(new: Option<&str>, edit: Option<&str>) -> Self {
        match (new, edit.map(str::trim).filter(|id| !id.is_empty())) {
            (_, Some(id)) => Panel::Edit(id.to_string()),
            (Some(_), None) => Panel::New,
            (None, None) => Panel::Closed,
        }
    }
}

/// List page for one entity: rows from a fresh fetch (which refills the
/// cache) plus the requested editor panel.
pub(crate) async fn list_page<T>(
    backend: &Backend,
    section: Section,
    entity: Entity,
    mut context: Value,
    panel: Panel,
    view: fn(&T) -> Value,
) -> Template
where
    T: DeserializeOwned + Send + 'static,
{
    let loaded = backend
        .run(move |b| {
            let listing = listing::load(b, entity);
            let items: Vec<Value> = listing.typed::<T>().iter().map(view).collect();
            let panel = match panel {
                Panel::Closed => None,
                Panel::New => Some(EditorPanel::default()),
                Panel::Retry(p) => Some(p),
                Panel::Edit(id) => Some(match editor::find_cached::<T>(b, entity, &id) {
                    Ok(record) => EditorPanel {
                        edit_id: Some(id),
                        values: view(&record),
                        error: None,
                    },
                    Err(e) => EditorPanel {
                        edit_id: None,
                        values: Value::Null,
                        error: Some(e.to_string()),
                    },
                }),
            };
            (items, listing.error, panel)
        })
        .await;

    match loaded {
        Ok((items, error, panel)) => {
            context["items"] = json!(items);
            context["load_error"] = json!(error);
            context["editor"] = json!(panel);
        }
        Err(e) => {
            context["items"] = json!([]);
            context["load_error"] = json!(e.to_string());
        }
    }
    Template::render(section.template(), &context)
}

/// Run an editor submit off the executor. On success redirect to the list with
/// a flash; on failure re-render the list with the panel still open.
pub(crate) async fn submit_page<E, T>(
    backend: &Backend,
    section: Section,
    slug: &AdminSlug,
    context: Value,
    input: E::Input,
    edit_id: Option<String>,
    values: Value,
    view: fn(&T) -> Value,
) -> Result<Flash<Redirect>, Template>
where
    E: RecordEditor + 'static,
    E::Input: Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let id = edit_id.clone();
    let result = backend
        .run(move |b| editor::submit::<E>(b, &input, id.as_deref()))
        .await
        .and_then(|r| r);
    match result {
        Ok(saved) => Ok(saved_flash(section.url(slug), E::ENTITY, &saved)),
        Err(e) => {
            let panel = EditorPanel {
                edit_id: edit_id.filter(|id| !id.trim().is_empty()),
                values,
                error: Some(e.to_string()),
            };
            Err(list_page::<T>(backend, section, E::ENTITY, context, Panel::Retry(panel), view).await)
        }
    }
}

pub(crate) async fn delete_redirect(
    backend: &Backend,
    section: Section,
    slug: &AdminSlug,
    entity: Entity,
    id: String,
) -> Flash<Redirect> {
    let result = backend
        .run(move |b| editor::remove(b, entity, &id))
        .await
        .and_then(|r| r);
    let to = Redirect::to(section.url(slug));
    match result {
        Ok(()) => Flash::success(to, format!("{} deleted successfully!", entity.noun())),
        Err(e) => Flash::error(to, e.to_string()),
    }
}

pub(crate) fn saved_flash(to: String, entity: Entity, saved: &Saved) -> Flash<Redirect> {
    let (kind, msg) = saved_message(entity, saved);
    Flash::new(Redirect::to(to), kind, msg)
}

/// Flash kind and text for a completed save; upload warnings downgrade it.
fn saved_message(entity: Entity, saved: &Saved) -> (&'static str, String) {
    let verb = if saved.created { "added" } else { "updated" };
    let mut msg = format!("{} {} successfully!", entity.noun(), verb);
    for w in &saved.warnings {
        msg.push(' ');
        msg.push_str(w);
    }
    let kind = if saved.warnings.is_empty() { "success" } else { "warning" };
    (kind, msg)
}

// ── Uploads ────────────────────────────────────────────

/// Read an uploaded form file into memory. `None` when no file was chosen.
pub(crate) async fn read_upload(file: Option<&TempFile<'_>>) -> Result<Option<Upload>, EditorError> {
    let Some(file) = file.filter(|f| f.len() > 0) else {
        return Ok(None);
    };

    // Original filename keeps the extension; fall back to the content type
    let file_name = file
        .raw_name()
        .map(|rn| rn.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .filter(|n| n.contains('.'))
        .or_else(|| {
            file.content_type()
                .and_then(|ct| ct.extension())
                .map(|ext| format!("upload.{}", ext))
        })
        .unwrap_or_else(|| "upload.jpg".to_string());

    let mut bytes = Vec::with_capacity(file.len() as usize);
    let reader = file
        .open()
        .await
        .map_err(|e| EditorError::Upload(format!("Failed to read upload: {}", e)))?;
    rocket::tokio::pin!(reader);
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| EditorError::Upload(format!("Failed to read upload: {}", e)))?;

    Ok(Some(Upload {
        file_name,
        content_type: file.content_type().map(|ct| ct.to_string()),
        bytes,
    }))
}

/// Upload read failures are shown on the re-rendered form like any other error.
pub(crate) async fn read_upload_or_panel(
    file: Option<&TempFile<'_>>,
    edit_id: &Option<String>,
    values: &Value,
) -> Result<Option<Upload>, EditorPanel> {
    read_upload(file).await.map_err(|e| EditorPanel {
        edit_id: edit_id.clone(),
        values: values.clone(),
        error: Some(e.to_string()),
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        leaders::leaders_list,
        leaders::leader_save,
        leaders::leader_delete,
        faculty::faculty_list,
        faculty::faculty_save,
        faculty::faculty_delete,
        students::students_list,
        students::student_save,
        students::student_delete,
        activities::activities_list,
        activities::activity_save,
        activities::activity_delete,
        achievements::achievements_list,
        achievements::achievement_save,
        achievements::achievement_delete,
        gallery::gallery_list,
        gallery::gallery_save,
        gallery::gallery_delete,
        content::content_page,
        content::content_save,
        contact::contact_page,
        contact::contact_info_save,
        contact::message_read,
        contact::message_replied,
        contact::message_archive,
        contact::message_notes,
        contact::message_delete,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_urls_and_titles() {
        let slug = AdminSlug("office".into());
        assert_eq!(Section::Dashboard.url(&slug), "/office");
        assert_eq!(Section::Leaders.url(&slug), "/office/leaders");
        assert_eq!(Section::Students.title(), "Student Management");
        assert_eq!(Section::ALL.len(), 9);
    }

    #[test]
    fn panel_from_query() {
        assert!(matches!(Panel::from_query(None, None), Panel::Closed));
        assert!(matches!(Panel::from_query(Some(""), None), Panel::New));
        assert!(matches!(Panel::from_query(None, Some("abc")), Panel::Edit(id) if id == "abc"));
        assert!(matches!(Panel::from_query(None, Some(" ")), Panel::Closed));
    }

    #[test]
    fn saved_message_mentions_warnings() {
        let saved = Saved {
            id: "1".into(),
            created: true,
            warnings: vec!["Error uploading photo: denied. Proceeding without photo.".into()],
        };
        let (kind, msg) = saved_message(Entity::Faculty, &saved);
        assert_eq!(kind, "warning");
        assert_eq!(
            msg,
            "Faculty member added successfully! Error uploading photo: denied. Proceeding without photo."
        );
    }

    #[test]
    fn saved_message_plain_update() {
        let saved = Saved {
            id: "1".into(),
            created: false,
            warnings: Vec::new(),
        };
        assert_eq!(
            saved_message(Entity::Faculty, &saved),
            ("success", "Faculty member updated successfully!".to_string())
        );
    }
}
