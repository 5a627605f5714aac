//! Image uploads: on-disk placement, single-instance header replacement and
//! the image plus relation rows that go with every file.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::Utc;
use folio_common::{ContentHash, ImagePurpose, paths};
use glob::Pattern;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::entity::site::{content_image, image, section_image};
use crate::error::{Result, SsgError};
use crate::repo::SiteRepo;
use crate::repo::site::ImageInput;
use crate::utils::filename::{escapes_root, image_extension};

/// An uploaded file and the accessibility fields sent with it.
#[derive(Debug, Default, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub title: String,
    pub alt_text: String,
    pub caption: String,
    pub long_description: String,
    pub decorative: bool,
}

/// Where a new file goes and which existing files it replaces.
#[derive(Debug, PartialEq, Eq)]
pub struct Placement {
    /// Directory relative to the site's images root.
    pub dir: PathBuf,
    pub file_name: String,
    /// Glob of same-purpose files to delete first. `None` for plain content images.
    pub replaces: Option<String>,
}

impl Placement {
    /// Files for a content item: `{section}/{content-slug}/`.
    pub fn for_content(
        purpose: ImagePurpose,
        section_path: &str,
        content_slug: &str,
        ext: &str,
        unix_seconds: i64,
    ) -> Result<Self> {
        let (file_name, replaces) = match purpose {
            ImagePurpose::Content => (format!("{content_slug}_{unix_seconds}{ext}"), None),
            ImagePurpose::Header | ImagePurpose::Thumbnail => {
                let stem = format!("{content_slug}_{purpose}_");
                (format!("{stem}{unix_seconds}{ext}"), Some(format!("{stem}*")))
            }
            ImagePurpose::SectionHeader | ImagePurpose::BlogHeader => {
                return Err(SsgError::Validation(format!(
                    "Purpose '{purpose}' applies to sections, not content"
                )));
            }
        };
        Ok(Self {
            dir: paths::content_image_dir(section_path, content_slug),
            file_name,
            replaces,
        })
    }

    /// Files for a section: `{section}/` for headers, `{section}/blog/` for blog headers.
    pub fn for_section(
        purpose: ImagePurpose,
        section_path: &str,
        ext: &str,
        unix_seconds: i64,
    ) -> Result<Self> {
        let dir = match purpose {
            ImagePurpose::SectionHeader => paths::section_image_dir(section_path),
            ImagePurpose::BlogHeader => paths::blog_header_dir(section_path),
            other => {
                return Err(SsgError::Validation(format!(
                    "Purpose '{other}' applies to content, not sections"
                )));
            }
        };
        Ok(Self {
            dir,
            file_name: format!("{purpose}_{unix_seconds}{ext}"),
            replaces: Some(format!("{purpose}_*")),
        })
    }

    /// Stored path with forward slashes, relative to the images root.
    pub fn relative_path(&self) -> String {
        let mut parts: Vec<String> = self
            .dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        parts.push(self.file_name.clone());
        parts.join("/")
    }
}

/// Delete files in `dir` whose name matches `pattern`. Returns how many went.
async fn remove_matching(dir: &Path, pattern: &str) -> Result<usize> {
    let pattern = Pattern::new(pattern)
        .map_err(|e| SsgError::Validation(format!("Invalid replacement pattern: {e}")))?;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if entry.file_type().await?.is_file() && pattern.matches(&name.to_string_lossy()) {
            tokio::fs::remove_file(entry.path()).await?;
            debug!(file = %entry.path().display(), "Removed replaced image");
            removed += 1;
        }
    }
    Ok(removed)
}

/// `name-3.png` from `name.png`.
fn numbered(file_name: &str, n: usize) -> String {
    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-{n}.{ext}"),
        None => format!("{stem}-{n}"),
    }
}

fn dimensions(data: &[u8]) -> (i32, i32) {
    ::image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|r| r.into_dimensions().ok())
        .map(|(w, h)| (i32::try_from(w).unwrap_or(0), i32::try_from(h).unwrap_or(0)))
        .unwrap_or((0, 0))
}

pub struct ImageManager<'a> {
    repo: &'a SiteRepo,
    images_root: &'a Path,
}

impl<'a> ImageManager<'a> {
    pub fn new(repo: &'a SiteRepo, images_root: &'a Path) -> Self {
        Self { repo, images_root }
    }

    /// Write the file, first removing replaced files. Returns the row input for it.
    async fn store(&self, mut placement: Placement, upload: &ImageUpload) -> Result<(PathBuf, ImageInput)> {
        let dir = self.images_root.join(&placement.dir);
        if escapes_root(&placement.dir) {
            return Err(SsgError::Validation("Image path leaves the images root".into()));
        }
        tokio::fs::create_dir_all(&dir).await?;
        if let Some(glob) = &placement.replaces {
            remove_matching(&dir, glob).await?;
        }

        let mut target = dir.join(&placement.file_name);
        if placement.replaces.is_none() {
            // Two content uploads within one second would share a name.
            let base = placement.file_name.clone();
            let mut n = 1;
            while tokio::fs::try_exists(&target).await? {
                placement.file_name = numbered(&base, n);
                target = dir.join(&placement.file_name);
                n += 1;
            }
        }
        tokio::fs::write(&target, &upload.data).await?;

        let (width, height) = dimensions(&upload.data);
        let input = ImageInput {
            file_name: placement.file_name.clone(),
            file_path: placement.relative_path(),
            file_hash: ContentHash::compute(&upload.data).to_hex(),
            mime: mime_guess::from_path(&placement.file_name)
                .first_or_octet_stream()
                .to_string(),
            size: upload.data.len() as i64,
            width,
            height,
            title: upload.title.clone(),
            alt_text: upload.alt_text.clone(),
            long_description: upload.long_description.clone(),
            caption: upload.caption.clone(),
            decorative: upload.decorative,
        };
        Ok((target, input))
    }

    async fn discard(target: &Path) {
        if let Err(e) = tokio::fs::remove_file(target).await {
            warn!(file = %target.display(), error = %e, "Failed to remove image after rollback");
        }
    }

    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn upload_for_content(
        &self,
        content_id: Uuid,
        purpose: ImagePurpose,
        upload: ImageUpload,
        actor: Uuid,
    ) -> Result<(content_image::Model, image::Model)> {
        let ext = image_extension(&upload.file_name)
            .map_err(|e| SsgError::Validation(e.message().into()))?;
        let content = self.repo.content_item(content_id).await?;
        let placement = Placement::for_content(
            purpose,
            &content.section_path,
            &content.slug(),
            &ext,
            Utc::now().timestamp(),
        )?;

        let (target, input) = self.store(placement, &upload).await?;
        let result = async {
            let tx = self.repo.begin_tx().await?;
            let img = tx.insert_image(&input, actor).await?;
            if purpose.is_single_instance() {
                tx.deactivate_content_images(content_id, purpose.relation_purpose())
                    .await?;
            }
            let position = tx.next_content_image_position(content_id).await?;
            let rel = tx
                .insert_content_image(content_id, img.id, purpose.relation_purpose(), position)
                .await?;
            tx.commit().await?;
            Ok::<_, SsgError>((rel, img))
        }
        .await;

        match result {
            Ok(pair) => {
                info!(path = %pair.1.file_path, purpose = %purpose, "Stored content image");
                Ok(pair)
            }
            Err(e) => {
                Self::discard(&target).await;
                Err(e)
            }
        }
    }

    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn upload_for_section(
        &self,
        section_id: Uuid,
        purpose: ImagePurpose,
        upload: ImageUpload,
        actor: Uuid,
    ) -> Result<(section_image::Model, image::Model)> {
        let ext = image_extension(&upload.file_name)
            .map_err(|e| SsgError::Validation(e.message().into()))?;
        let section = self.repo.section(section_id).await?;
        let placement =
            Placement::for_section(purpose, &section.path, &ext, Utc::now().timestamp())?;

        let (target, input) = self.store(placement, &upload).await?;
        let result = async {
            let tx = self.repo.begin_tx().await?;
            let img = tx.insert_image(&input, actor).await?;
            tx.deactivate_section_images(section_id, purpose.relation_purpose())
                .await?;
            let rel = tx
                .insert_section_image(section_id, img.id, purpose.relation_purpose())
                .await?;
            tx.commit().await?;
            Ok::<_, SsgError>((rel, img))
        }
        .await;

        match result {
            Ok(pair) => {
                info!(path = %pair.1.file_path, purpose = %purpose, "Stored section image");
                Ok(pair)
            }
            Err(e) => {
                Self::discard(&target).await;
                Err(e)
            }
        }
    }

    async fn remove_file(&self, img: &image::Model) -> Result<()> {
        let rel = Path::new(&img.file_path);
        if escapes_root(rel) {
            return Err(SsgError::Validation("Image path leaves the images root".into()));
        }
        match tokio::fs::remove_file(self.images_root.join(rel)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a content image relation and its file. A missing file is fine.
    pub async fn delete_for_content(&self, content_id: Uuid, relation_id: Uuid) -> Result<()> {
        let img = self.repo.delete_content_image(content_id, relation_id).await?;
        self.remove_file(&img).await
    }

    pub async fn delete_for_section(&self, section_id: Uuid, relation_id: Uuid) -> Result<()> {
        let img = self.repo.delete_section_image(section_id, relation_id).await?;
        self.remove_file(&img).await
    }
}
