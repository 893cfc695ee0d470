#![cfg(test)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::editor::achievement::{AchievementEditor, AchievementInput};
use crate::editor::activity::{ActivityEditor, ActivityInput};
use crate::editor::contact::{ContactInfoEditor, ContactInfoInput};
use crate::editor::content::{ContentEditor, ContentInput};
use crate::editor::faculty::{FacultyEditor, FacultyInput};
use crate::editor::gallery::{GalleryEditor, GalleryInput};
use crate::editor::leader::{LeaderEditor, LeaderInput};
use crate::editor::message::{ContactMessageEditor, ContactMessageInput};
use crate::editor::student::{StudentEditor, StudentInput};
use crate::editor::{self, EditorError};
use crate::listing;
use crate::media::{Bucket, MediaStore, Upload};
use crate::messages;
use crate::models::faculty::Faculty;
use crate::models::message::{ContactMessage, MessageFilter, MessageStatus};
use crate::models::student::Student;
use crate::site;
use crate::store::sqlite::SqliteStore;
use crate::store::{Entity, Query, Row, Store};

// ── Test doubles ─────────────────────────────────────────

/// SqliteStore over a single in-memory connection that records every call
/// and can be switched into failing mode.
struct RecordingStore {
    inner: SqliteStore,
    calls: Mutex<Vec<(&'static str, Entity)>>,
    failing: AtomicBool,
}

impl RecordingStore {
    fn new() -> Self {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create test pool");
        let inner = SqliteStore::new(pool);
        inner.run_migrations().expect("Failed to run migrations");
        RecordingStore {
            inner,
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    fn record(&self, op: &'static str, entity: Entity) -> Result<(), String> {
        self.calls.lock().unwrap().push((op, entity));
        if self.failing.load(Ordering::SeqCst) {
            Err("service unavailable".into())
        } else {
            Ok(())
        }
    }

    fn count_calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(o, _)| *o == op).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

impl Store for RecordingStore {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    fn run_migrations(&self) -> Result<(), String> {
        Ok(())
    }

    fn select(&self, entity: Entity, query: &Query) -> Result<Vec<Row>, String> {
        self.record("select", entity)?;
        self.inner.select(entity, query)
    }

    fn insert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        self.record("insert", entity)?;
        self.inner.insert(entity, row)
    }

    fn update(&self, entity: Entity, id: &str, patch: &Row) -> Result<Option<Row>, String> {
        self.record("update", entity)?;
        self.inner.update(entity, id, patch)
    }

    fn delete(&self, entity: Entity, id: &str) -> Result<(), String> {
        self.record("delete", entity)?;
        self.inner.delete(entity, id)
    }

    fn upsert(&self, entity: Entity, row: &Row) -> Result<Row, String> {
        self.record("upsert", entity)?;
        self.inner.upsert(entity, row)
    }

    fn count(&self, entity: Entity) -> Result<i64, String> {
        self.record("count", entity)?;
        self.inner.count(entity)
    }
}

/// Media store that keeps nothing and hands back predictable URLs.
#[derive(Default)]
struct FakeMedia {
    uploads: Mutex<Vec<(Bucket, String)>>,
    failing: AtomicBool,
}

impl FakeMedia {
    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

impl MediaStore for FakeMedia {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn upload(&self, bucket: Bucket, file: &Upload) -> Result<String, String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("Bucket not found".into());
        }
        self.uploads.lock().unwrap().push((bucket, file.file_name.clone()));
        Ok(format!("/uploads/{}/{}", bucket.name(), file.file_name))
    }
}

fn setup() -> (Backend, Arc<RecordingStore>, Arc<FakeMedia>) {
    let store = Arc::new(RecordingStore::new());
    let media = Arc::new(FakeMedia::default());
    let backend = Backend::new(store.clone(), media.clone());
    (backend, store, media)
}

fn image(name: &str) -> Upload {
    Upload {
        file_name: name.to_string(),
        content_type: Some("image/jpeg".into()),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

fn student(name: &str, cgpa: &str, topper: bool) -> StudentInput {
    StudentInput {
        name: name.to_string(),
        roll_number: format!("AI-{}", name.len()),
        year: "3".into(),
        cgpa: cgpa.into(),
        is_topper: topper,
        ..Default::default()
    }
}

fn faculty(name: &str) -> FacultyInput {
    FacultyInput {
        name: name.to_string(),
        role: "Assistant Professor".into(),
        ..Default::default()
    }
}

// ── Record editors ───────────────────────────────────────

#[test]
fn test_missing_faculty_name_makes_no_calls() {
    let (backend, store, media) = setup();
    let input = FacultyInput {
        name: "   ".into(),
        role: "Professor".into(),
        photo: Some(image("rao.jpg")),
        ..Default::default()
    };
    let err = editor::submit::<FacultyEditor>(&backend, &input, None).unwrap_err();
    assert_eq!(err, EditorError::Validation("Please enter faculty name!".into()));
    assert_eq!(store.total_calls(), 0);
    assert_eq!(media.upload_count(), 0);
}

#[test]
fn test_blank_required_fields_make_no_calls() {
    let (backend, store, media) = setup();
    let student = StudentInput {
        photo: Some(image("s.jpg")),
        ..student("", "8.1", false)
    };
    assert!(editor::submit::<StudentEditor>(&backend, &student, None).is_err());
    let leader = LeaderInput {
        position: "Dean".into(),
        photo: Some(image("l.jpg")),
        ..Default::default()
    };
    assert!(editor::submit::<LeaderEditor>(&backend, &leader, None).is_err());
    let info = ContactInfoInput {
        address: "Bidar".into(),
        email: "office@example.edu".into(),
        ..Default::default()
    };
    assert_eq!(
        editor::submit::<ContactInfoEditor>(&backend, &info, None).unwrap_err().to_string(),
        "Please fill in all required fields (Address, Phone, Email)!"
    );
    let message = ContactMessageInput {
        name: "Ravi".into(),
        ..Default::default()
    };
    assert!(editor::submit::<ContactMessageEditor>(&backend, &message, None).is_err());

    assert_eq!(store.total_calls(), 0);
    assert_eq!(media.upload_count(), 0);
}

#[test]
fn test_created_faculty_appears_once_on_reload() {
    let (backend, store, _) = setup();
    let saved = editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Meera Iyer"), None).unwrap();
    assert!(saved.created);
    assert_eq!(store.count_calls("insert"), 1);

    let list = listing::load(&backend, Entity::Faculty);
    assert!(list.error.is_none());
    let rows: Vec<Faculty> = list.typed();
    assert_eq!(rows.iter().filter(|f| f.name == "Dr. Meera Iyer").count(), 1);
    assert_eq!(rows[0].id, saved.id);
    assert_eq!(rows[0].department.as_deref(), Some("AIML"));
}

#[test]
fn test_student_without_photo_shows_two_decimal_cgpa() {
    let (backend, _, media) = setup();
    let saved = editor::submit::<StudentEditor>(&backend, &student("Asha Rao", "8.7", false), None).unwrap();
    assert!(saved.warnings.is_empty());
    assert_eq!(media.upload_count(), 0);

    let rows: Vec<Student> = listing::load(&backend, Entity::Students).typed();
    assert_eq!(rows.len(), 1);
    let view = rows[0].view();
    assert_eq!(view["name"], json!("Asha Rao"));
    assert_eq!(view["cgpa_display"], json!("8.70"));
    assert_eq!(view["photo_url"], Value::Null);
    assert_eq!(view["year_label"], json!("3rd Year"));
}

#[test]
fn test_activity_without_description_skips_upload_and_insert() {
    let (backend, store, media) = setup();
    let input = ActivityInput {
        title: "Hackathon".into(),
        description: "  ".into(),
        image: Some(image("hack.png")),
    };
    let err = editor::submit::<ActivityEditor>(&backend, &input, None).unwrap_err();
    assert!(matches!(err, EditorError::Validation(_)));
    assert_eq!(media.upload_count(), 0);
    assert_eq!(store.count_calls("insert"), 0);
}

#[test]
fn test_required_image_missing_on_create() {
    let (backend, store, _) = setup();
    let input = GalleryInput {
        caption: "Lab".into(),
        ..Default::default()
    };
    let err = editor::submit::<GalleryEditor>(&backend, &input, None).unwrap_err();
    assert_eq!(err, EditorError::Validation("Please select an image!".into()));

    let leader = LeaderInput {
        name: "Dr. K. Rao".into(),
        position: "HOD".into(),
        ..Default::default()
    };
    let err = editor::submit::<LeaderEditor>(&backend, &leader, None).unwrap_err();
    assert_eq!(err, EditorError::Validation("Please select a photo!".into()));
    assert_eq!(store.total_calls(), 0);
}

#[test]
fn test_optional_upload_failure_is_a_warning() {
    let (backend, store, media) = setup();
    media.failing.store(true, Ordering::SeqCst);
    let input = FacultyInput {
        photo: Some(image("rao.jpg")),
        ..faculty("Dr. Rao")
    };
    let saved = editor::submit::<FacultyEditor>(&backend, &input, None).unwrap();
    assert_eq!(saved.warnings.len(), 1);
    assert!(saved.warnings[0].starts_with("Error uploading photo: Bucket not found"));
    assert_eq!(store.count_calls("insert"), 1);

    let rows: Vec<Faculty> = listing::load(&backend, Entity::Faculty).typed();
    assert_eq!(rows[0].photo_url, None);
}

#[test]
fn test_required_upload_failure_aborts() {
    let (backend, store, media) = setup();
    media.failing.store(true, Ordering::SeqCst);
    let input = AchievementInput {
        title: String::new(),
        image: Some(image("trophy.jpg")),
    };
    let err = editor::submit::<AchievementEditor>(&backend, &input, None).unwrap_err();
    assert_eq!(err, EditorError::Upload("Bucket not found".into()));
    assert_eq!(err.to_string(), "Error uploading image: Bucket not found");
    assert_eq!(store.count_calls("insert"), 0);
}

#[test]
fn test_uploaded_image_url_is_stored() {
    let (backend, _, media) = setup();
    let input = GalleryInput {
        caption: "Robotics lab".into(),
        description: String::new(),
        image: Some(image("lab.webp")),
    };
    editor::submit::<GalleryEditor>(&backend, &input, None).unwrap();
    assert_eq!(media.uploads.lock().unwrap()[0].0, Bucket::GalleryImages);

    let rows = listing::load(&backend, Entity::Gallery).rows;
    assert_eq!(rows[0]["image_url"], json!("/uploads/gallery-images/lab.webp"));
    assert_eq!(rows[0]["description"], Value::Null);
}

#[test]
fn test_edit_without_new_photo_keeps_existing() {
    let (backend, _, _) = setup();
    let input = FacultyInput {
        photo: Some(image("rao.jpg")),
        ..faculty("Dr. Rao")
    };
    let saved = editor::submit::<FacultyEditor>(&backend, &input, None).unwrap();

    let edit = FacultyInput {
        role: "Professor".into(),
        ..faculty("Dr. Rao")
    };
    let updated = editor::submit::<FacultyEditor>(&backend, &edit, Some(&saved.id)).unwrap();
    assert!(!updated.created);

    let record: Faculty = editor::find_cached(&backend, Entity::Faculty, &saved.id).unwrap();
    assert_eq!(record.role, "Professor");
    assert_eq!(record.photo_url.as_deref(), Some("/uploads/faculty-photos/rao.jpg"));
}

#[test]
fn test_edit_of_vanished_record_is_not_found() {
    let (backend, _, _) = setup();
    let err = editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), Some("no-such-id")).unwrap_err();
    assert_eq!(err, EditorError::NotFound("Faculty member not found!".into()));
}

#[test]
fn test_delete_of_unknown_id_never_calls_delete() {
    let (backend, store, _) = setup();
    editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap();

    let err = editor::remove(&backend, Entity::Faculty, "not-in-list").unwrap_err();
    assert_eq!(err.to_string(), "Faculty member not found!");
    assert_eq!(store.count_calls("delete"), 0);
}

#[test]
fn test_delete_listed_record() {
    let (backend, store, _) = setup();
    let saved = editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap();
    listing::load(&backend, Entity::Faculty);

    editor::remove(&backend, Entity::Faculty, &saved.id).unwrap();
    assert_eq!(store.count_calls("delete"), 1);
    assert!(backend.cache.rows(Entity::Faculty).is_none());
    assert!(listing::load(&backend, Entity::Faculty).rows.is_empty());
}

#[test]
fn test_singleton_content_is_upserted_in_place() {
    let (backend, store, _) = setup();
    let first = ContentInput {
        tagline: "Learning by building".into(),
        ..Default::default()
    };
    editor::submit::<ContentEditor>(&backend, &first, None).unwrap();
    let second = ContentInput {
        tagline: "Shaping intelligent futures".into(),
        vision: "Excellence in AI".into(),
        ..Default::default()
    };
    editor::submit::<ContentEditor>(&backend, &second, None).unwrap();

    assert_eq!(store.count_calls("upsert"), 2);
    assert_eq!(store.inner.count(Entity::Content).unwrap(), 1);
    let row = store.inner.select_single(Entity::Content).unwrap().unwrap();
    assert_eq!(row["tagline"], json!("Shaping intelligent futures"));
}

#[test]
fn test_backend_failure_message_names_action() {
    let (backend, store, _) = setup();
    store.fail(true);
    let err = editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap_err();
    assert_eq!(err.to_string(), "Error adding faculty member: service unavailable");
}

// ── Listing cache ────────────────────────────────────────

#[test]
fn test_failed_reload_keeps_cached_rows() {
    let (backend, store, _) = setup();
    editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap();
    assert_eq!(listing::load(&backend, Entity::Faculty).rows.len(), 1);

    store.fail(true);
    let list = listing::load(&backend, Entity::Faculty);
    assert_eq!(list.rows.len(), 1);
    assert!(list.error.unwrap().starts_with("Error loading faculty"));
}

// ── Public home page ─────────────────────────────────────

#[test]
fn test_toppers_are_top_three_by_cgpa() {
    let (backend, _, _) = setup();
    for (name, cgpa, topper) in [
        ("Asha", "9.1", true),
        ("Bala", "9.8", true),
        ("Chitra", "8.2", true),
        ("Dev", "9.9", false),
        ("Esha", "9.5", true),
    ] {
        editor::submit::<StudentEditor>(&backend, &student(name, cgpa, topper), None).unwrap();
    }

    let home = site::build_home(&backend);
    assert!(home.toppers.live);
    let names: Vec<&str> = home.toppers.items.iter().filter_map(|s| s["name"].as_str()).collect();
    assert_eq!(names, vec!["Bala", "Esha", "Asha"]);
    assert_eq!(home.toppers.items[0]["cgpa_display"], json!("9.80"));
}

#[test]
fn test_leadership_in_display_order() {
    let (backend, _, _) = setup();
    for (name, order) in [("Principal", "2"), ("HOD", "1"), ("Coordinator", "3")] {
        let input = LeaderInput {
            name: name.into(),
            position: name.into(),
            display_order: order.into(),
            photo: Some(image("p.jpg")),
        };
        editor::submit::<LeaderEditor>(&backend, &input, None).unwrap();
    }

    let home = site::build_home(&backend);
    let names: Vec<&str> = home.leadership.items.iter().filter_map(|l| l["name"].as_str()).collect();
    assert_eq!(names, vec!["HOD", "Principal", "Coordinator"]);
}

#[test]
fn test_home_falls_back_when_backend_fails() {
    let (backend, store, _) = setup();
    editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap();
    store.fail(true);

    let home = site::build_home(&backend);
    assert!(!home.faculty.live);
    assert!(!home.gallery.live);
    assert!(home.content.is_none());
    assert!(home.contact.is_empty());
}

#[test]
fn test_home_empty_sections_are_not_live() {
    let (backend, _, _) = setup();
    editor::submit::<FacultyEditor>(&backend, &faculty("Dr. Rao"), None).unwrap();

    let home = site::build_home(&backend);
    assert!(home.faculty.live);
    assert!(!home.activities.live);
    assert!(!home.toppers.live);
}

// ── Contact messages ─────────────────────────────────────

fn send_message(backend: &Backend, name: &str) -> String {
    let input = ContactMessageInput {
        name: name.into(),
        email: "visitor@example.com".into(),
        message: "When do admissions open?".into(),
    };
    editor::submit::<ContactMessageEditor>(backend, &input, None).unwrap().id
}

#[test]
fn test_replied_message_leaves_new_filter() {
    let (backend, _, _) = setup();
    let id = send_message(&backend, "Ravi");
    send_message(&backend, "Sita");

    let fresh: Vec<ContactMessage> = messages::list(&backend, MessageFilter::Only(MessageStatus::New)).typed();
    assert_eq!(fresh.len(), 2);

    assert_eq!(messages::mark_replied(&backend, &id).unwrap(), MessageStatus::Replied);
    let message = messages::get(&backend, &id).unwrap();
    assert_eq!(message.status, MessageStatus::Replied);
    assert!(message.replied_at.is_some());

    let fresh: Vec<ContactMessage> = messages::list(&backend, MessageFilter::Only(MessageStatus::New)).typed();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "Sita");
    assert_eq!(messages::list(&backend, MessageFilter::All).rows.len(), 2);
}

#[test]
fn test_mark_read_only_moves_new_messages() {
    let (backend, _, _) = setup();
    let id = send_message(&backend, "Ravi");
    assert_eq!(messages::mark_read(&backend, &id).unwrap(), MessageStatus::Read);

    messages::mark_replied(&backend, &id).unwrap();
    assert_eq!(messages::mark_read(&backend, &id).unwrap(), MessageStatus::Replied);
}

#[test]
fn test_filtered_list_keeps_other_messages_reachable() {
    let (backend, store, _) = setup();
    let id = send_message(&backend, "Ravi");
    send_message(&backend, "Sita");
    messages::mark_read(&backend, &id).unwrap();

    let fresh: Vec<ContactMessage> = messages::list(&backend, MessageFilter::Only(MessageStatus::New)).typed();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "Sita");

    assert_eq!(messages::archive(&backend, &id, true).unwrap(), MessageStatus::Archived);
    messages::list(&backend, MessageFilter::Only(MessageStatus::New));
    messages::delete(&backend, &id).unwrap();
    assert_eq!(store.count_calls("delete"), 1);
    assert_eq!(messages::list(&backend, MessageFilter::All).rows.len(), 1);
}

#[test]
fn test_failed_filtered_list_shows_only_matching_cached_rows() {
    let (backend, store, _) = setup();
    let id = send_message(&backend, "Ravi");
    send_message(&backend, "Sita");
    messages::mark_read(&backend, &id).unwrap();
    assert_eq!(messages::list(&backend, MessageFilter::All).rows.len(), 2);

    store.fail(true);
    let listing = messages::list(&backend, MessageFilter::Only(MessageStatus::New));
    assert!(listing.error.is_some());
    let rows: Vec<ContactMessage> = listing.typed();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Sita");
}

#[test]
fn test_archive_needs_confirmation() {
    let (backend, store, _) = setup();
    let id = send_message(&backend, "Ravi");
    let before = store.count_calls("update");
    assert!(matches!(messages::archive(&backend, &id, false), Err(EditorError::Validation(_))));
    assert_eq!(store.count_calls("update"), before);

    assert_eq!(messages::archive(&backend, &id, true).unwrap(), MessageStatus::Archived);
}

#[test]
fn test_notes_are_saved_and_cleared() {
    let (backend, _, _) = setup();
    let id = send_message(&backend, "Ravi");
    messages::save_notes(&backend, &id, "  Called back on Monday ").unwrap();
    assert_eq!(
        messages::get(&backend, &id).unwrap().admin_notes.as_deref(),
        Some("Called back on Monday")
    );
    messages::save_notes(&backend, &id, "").unwrap();
    assert_eq!(messages::get(&backend, &id).unwrap().admin_notes, None);
}

#[test]
fn test_invalid_contact_email_is_rejected() {
    let (backend, store, _) = setup();
    let input = ContactMessageInput {
        name: "Ravi".into(),
        email: "ravi-at-example".into(),
        message: "Hello".into(),
    };
    let err = editor::submit::<ContactMessageEditor>(&backend, &input, None).unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid email address.");
    assert_eq!(store.total_calls(), 0);
}
