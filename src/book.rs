//! Book contents as the reader sees them: a spine of chapter ids, a manifest
//! mapping ids to archive paths, and an archive the chapter markup is read from.

use anyhow::{Context, Result};
use async_trait::async_trait;
use epub::doc::EpubDoc;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineRef {
    pub idref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookContent {
    pub chapters: Vec<SpineRef>,
    pub items: Vec<ManifestItem>,
}

impl BookContent {
    /// Archive path of the chapter at `index`.
    pub fn chapter_href(&self, index: usize) -> Result<String, ChapterError> {
        let chapter = self
            .chapters
            .get(index)
            .ok_or(ChapterError::ChapterOutOfRange {
                index,
                count: self.chapters.len(),
            })?;
        self.items
            .iter()
            .find(|item| item.id == chapter.idref)
            .map(|item| item.href.clone())
            .ok_or_else(|| ChapterError::MissingChapterReference {
                idref: chapter.idref.clone(),
            })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChapterError {
    #[error("chapter {index} is out of range; the book has {count} chapters")]
    ChapterOutOfRange { index: usize, count: usize },
    #[error("spine entry {idref:?} has no manifest item")]
    MissingChapterReference { idref: String },
    #[error("archive has no entry at {href:?}")]
    EntryMissing { href: String },
    #[error("failed to read {href:?} from the archive: {message}")]
    Archive { href: String, message: String },
}

#[async_trait]
pub trait ChapterArchive: Send + Sync {
    /// Markup stored at `href`, or `None` when the archive has no such entry.
    async fn file(&self, href: &str) -> anyhow::Result<Option<String>>;
}

pub async fn fetch_chapter(archive: &dyn ChapterArchive, href: &str) -> Result<String, ChapterError> {
    match archive.file(href).await {
        Ok(Some(html)) => {
            debug!(href, bytes = html.len(), "Read chapter from archive");
            Ok(html)
        }
        Ok(None) => Err(ChapterError::EntryMissing {
            href: href.to_string(),
        }),
        Err(err) => Err(ChapterError::Archive {
            href: href.to_string(),
            message: format!("{err:#}"),
        }),
    }
}

#[derive(Clone)]
pub struct BookData {
    pub title: String,
    pub content: BookContent,
    pub archive: Arc<dyn ChapterArchive>,
}

impl fmt::Debug for BookData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookData")
            .field("title", &self.title)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

impl BookData {
    pub fn new(
        title: impl Into<String>,
        content: BookContent,
        archive: Arc<dyn ChapterArchive>,
    ) -> Self {
        Self {
            title: title.into(),
            content,
            archive,
        }
    }

    pub fn chapter_count(&self) -> usize {
        self.content.chapters.len()
    }

    /// Whether `other` is the same opened book rather than a reload of it.
    pub fn same_book(&self, other: &BookData) -> bool {
        Arc::ptr_eq(&self.archive, &other.archive) && self.content == other.content
    }
}

/// Archive backed by an in-memory map of path to markup.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    files: HashMap<String, String>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, href: impl Into<String>, html: impl Into<String>) -> Self {
        self.files.insert(href.into(), html.into());
        self
    }
}

#[async_trait]
impl ChapterArchive for MemoryArchive {
    async fn file(&self, href: &str) -> anyhow::Result<Option<String>> {
        Ok(self.files.get(href).cloned())
    }
}

/// An opened `.epub` package.
pub struct EpubArchive {
    doc: Mutex<EpubDoc<BufReader<File>>>,
}

#[async_trait]
impl ChapterArchive for EpubArchive {
    async fn file(&self, href: &str) -> anyhow::Result<Option<String>> {
        let mut doc = self
            .doc
            .lock()
            .map_err(|_| anyhow::anyhow!("EPUB archive lock poisoned"))?;
        Ok(doc.get_resource_str_by_path(href))
    }
}

/// Open the EPUB at `path` and list its spine and manifest.
pub fn load_book(path: &Path) -> Result<BookData> {
    info!(path = %path.display(), "Opening EPUB");
    let doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;

    let chapters = doc
        .spine
        .iter()
        .map(|item| SpineRef {
            idref: item.idref.clone(),
        })
        .collect::<Vec<_>>();
    let mut items = doc
        .resources
        .iter()
        .map(|(id, resource)| ManifestItem {
            id: id.clone(),
            href: resource.path.to_string_lossy().to_string(),
        })
        .collect::<Vec<_>>();
    items.sort_by(|a, b| a.id.cmp(&b.id));

    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string());
    info!(
        title = %title,
        chapters = chapters.len(),
        items = items.len(),
        "Loaded EPUB package"
    );
    Ok(BookData::new(
        title,
        BookContent { chapters, items },
        Arc::new(EpubArchive {
            doc: Mutex::new(doc),
        }),
    ))
}
