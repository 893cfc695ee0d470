//! Public home page composed from live data. Each section falls back to the
//! template's static markup when its fetch fails or comes back empty.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::backend::Backend;
use crate::models::achievement::Achievement;
use crate::models::activity::Activity;
use crate::models::contact::{ContactInfo, ContactLine};
use crate::models::content::SiteContent;
use crate::models::faculty::Faculty;
use crate::models::gallery::GalleryImage;
use crate::models::leader::Leader;
use crate::models::student::Student;
use crate::store::{fetch, fetch_single, Entity, Order, Query};

pub const GALLERY_LIMIT: u32 = 6;
pub const TOPPER_LIMIT: u32 = 3;

/// `live == false` tells the template to keep its static markup.
#[derive(Debug, Serialize, Clone, Default)]
pub struct Section {
    pub live: bool,
    pub items: Vec<Value>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct HomePage {
    pub faculty: Section,
    pub leadership: Section,
    pub activities: Section,
    pub achievements: Section,
    pub gallery: Section,
    pub toppers: Section,
    pub content: Option<Value>,
    pub contact: Vec<ContactLine>,
}

pub fn toppers_query() -> Query {
    Query::new()
        .eq("is_topper", true)
        .order(Order::desc("cgpa"))
        .limit(TOPPER_LIMIT)
}

pub fn build_home(backend: &Backend) -> HomePage {
    HomePage {
        faculty: section::<Faculty>(
            backend,
            Entity::Faculty,
            &Query::new().order(Order::asc("created_at")),
            |f| json!(f),
        ),
        leadership: section::<Leader>(
            backend,
            Entity::Leadership,
            &Query::new().order(Order::asc("display_order")),
            |l| json!(l),
        ),
        activities: section::<Activity>(
            backend,
            Entity::Activities,
            &Query::new().order(Order::desc("created_at")),
            |a| json!(a),
        ),
        achievements: section::<Achievement>(
            backend,
            Entity::Achievements,
            &Query::new().order(Order::desc("created_at")),
            |a| {
                let mut v = json!(a);
                v["display_title"] = json!(a.display_title());
                v
            },
        ),
        gallery: section::<GalleryImage>(
            backend,
            Entity::Gallery,
            &Query::new().order(Order::desc("created_at")).limit(GALLERY_LIMIT),
            |g| json!(g),
        ),
        toppers: section::<Student>(backend, Entity::Students, &toppers_query(), Student::view),
        content: single::<SiteContent>(backend, Entity::Content).map(|c| {
            let mut v = json!(c);
            v["tagline_display"] = json!(c.tagline_display());
            v
        }),
        contact: single::<ContactInfo>(backend, Entity::ContactInfo)
            .map(|c| c.lines())
            .unwrap_or_default(),
    }
}

fn section<T: DeserializeOwned>(
    backend: &Backend,
    entity: Entity,
    query: &Query,
    view: impl Fn(&T) -> Value,
) -> Section {
    match fetch::<T>(backend.store.as_ref(), entity, query) {
        Ok(items) if !items.is_empty() => Section {
            live: true,
            items: items.iter().map(view).collect(),
        },
        Ok(_) => Section::default(),
        Err(e) => {
            log::warn!("Public {} fell back to static content: {}", entity.table(), e);
            Section::default()
        }
    }
}

fn single<T: DeserializeOwned>(backend: &Backend, entity: Entity) -> Option<T> {
    match fetch_single(backend.store.as_ref(), entity) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Public {} fell back to static content: {}", entity.table(), e);
            None
        }
    }
}
