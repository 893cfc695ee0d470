use rand::Rng;
use serde::Serialize;

pub mod hosted;
pub mod local;

/// Storage buckets, one per kind of uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    StudentPhotos,
    ActivityImages,
    AchievementImages,
    FacultyPhotos,
    LeadershipPhotos,
    GalleryImages,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::StudentPhotos,
        Bucket::ActivityImages,
        Bucket::AchievementImages,
        Bucket::FacultyPhotos,
        Bucket::LeadershipPhotos,
        Bucket::GalleryImages,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::StudentPhotos => "student-photos",
            Bucket::ActivityImages => "activity-images",
            Bucket::AchievementImages => "achievement-images",
            Bucket::FacultyPhotos => "faculty-photos",
            Bucket::LeadershipPhotos => "leadership-photos",
            Bucket::GalleryImages => "gallery-images",
        }
    }
}

/// A file received from an admin form, fully read into memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Object storage. `upload` returns the public URL of the stored object.
pub trait MediaStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn upload(&self, bucket: Bucket, file: &Upload) -> Result<String, String>;
}

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Lowercased extension of `file_name`, "jpg" when there is none.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => "jpg".to_string(),
    }
}

pub fn is_allowed_image(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// `<base36 token>-<unix millis>.<ext>`
pub fn random_object_name(file_name: &str) -> String {
    let token = to_base36(rand::thread_rng().gen::<u64>());
    format!(
        "{}-{}.{}",
        token,
        chrono::Utc::now().timestamp_millis(),
        extension_of(file_name)
    )
}

/// Checks shared by every media backend before any bytes are written.
pub(crate) fn check_upload(file: &Upload) -> Result<String, String> {
    if file.is_empty() {
        return Err(format!("{} is empty", file.file_name));
    }
    let ext = extension_of(&file.file_name);
    if !is_allowed_image(&ext) {
        return Err(format!("Unsupported file type: .{}", ext));
    }
    Ok(random_object_name(&file.file_name))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
