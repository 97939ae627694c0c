//! JSON document persistence.
//!
//! Layout under the story root:
//!
//! ```text
//! <root>/settings.json
//! <root>/<category>/<title>.json
//! <root>/<category>/<title>_canvas.json
//! ```
//!
//! Writes go to a temp file in the target directory and are renamed over the
//! destination, so a crash mid-save leaves either the old or the new document
//! and never a truncated one. Reads distinguish a missing document (first
//! run, created from defaults) from a corrupt one (moved aside to
//! `<file>.corrupt` and replaced by defaults, reported through
//! [`LoadStatus::Recovered`]).

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storydock_core::{AttributeMap, ErrorKind, PanelKind};

use crate::canvas::CanvasDocument;
use crate::reconcile::{RequiredFields, reconcile_in_place};

const SETTINGS_FILE: &str = "settings.json";
const CANVAS_SUFFIX: &str = "_canvas";
const CORRUPT_SUFFIX: &str = "corrupt";

/// Failures reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document {} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("document {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DocumentError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::DocumentNotFound,
            Self::Corrupt { .. } => ErrorKind::DocumentCorrupt,
            Self::Io { .. } | Self::Encode { .. } => ErrorKind::Io,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::Corrupt { path, .. }
            | Self::Io { path, .. }
            | Self::Encode { path, .. } => path,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// How [`DocumentCodec::load_or_create`] produced its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Read from disk, already complete.
    Loaded,
    /// No document existed; defaults were written.
    Created,
    /// Read from disk and completed with defaults; the result was written back.
    Repaired { filled: Vec<String> },
    /// The stored document was unreadable and replaced by defaults.
    ///
    /// `preserved` names where the bad file was moved. When it is `None` the
    /// bad file could not be moved and was left in place untouched; the
    /// defaults then live in memory only.
    Recovered {
        reason: String,
        preserved: Option<PathBuf>,
    },
}

/// A loaded document and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome<T = AttributeMap> {
    pub document: T,
    pub status: LoadStatus,
}

impl<T> LoadOutcome<T> {
    /// True when the stored document was corrupt.
    #[must_use]
    pub const fn was_recovered(&self) -> bool {
        matches!(self.status, LoadStatus::Recovered { .. })
    }
}

/// Reads and writes the JSON documents of one story.
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    root: PathBuf,
}

impl DocumentCodec {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// `<root>/<category>/<title>.json`.
    #[must_use]
    pub fn document_path(&self, kind: PanelKind, title: &str) -> PathBuf {
        self.root
            .join(kind.category())
            .join(format!("{}.json", escape_file_stem(title)))
    }

    /// `<root>/<category>/<title>_canvas.json`.
    #[must_use]
    pub fn canvas_path(&self, kind: PanelKind, title: &str) -> PathBuf {
        self.root
            .join(kind.category())
            .join(format!("{}{CANVAS_SUFFIX}.json", escape_file_stem(title)))
    }

    // ---------------------------------------------------------------------
    // Raw access
    // ---------------------------------------------------------------------

    /// Read and parse a document whose top level must be a JSON object.
    pub fn load(&self, path: &Path) -> Result<AttributeMap, DocumentError> {
        match read_json::<Value>(path)? {
            Value::Object(map) => Ok(map),
            other => Err(DocumentError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("top-level value is {} instead of an object", json_type(&other)),
            }),
        }
    }

    /// Write `document` as pretty JSON, atomically.
    pub fn save(&self, path: &Path, document: &AttributeMap) -> Result<(), DocumentError> {
        write_json(path, document)?;
        tracing::debug!(path = %path.display(), keys = document.len(), "document saved");
        Ok(())
    }

    /// Delete a document. Returns `false` when there was nothing to delete.
    pub fn remove(&self, path: &Path) -> Result<bool, DocumentError> {
        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "document removed");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(DocumentError::io(path, err)),
        }
    }

    /// Move a document. Returns `false` when `from` did not exist.
    ///
    /// An existing file at `to` is replaced.
    pub fn rename(&self, from: &Path, to: &Path) -> Result<bool, DocumentError> {
        if !from.exists() {
            return Ok(false);
        }
        ensure_parent_dir(to)?;
        fs::rename(from, to).map_err(|err| DocumentError::io(from, err))?;
        tracing::debug!(from = %from.display(), to = %to.display(), "document renamed");
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Load with recovery
    // ---------------------------------------------------------------------

    /// Load the document at `path`, completing it against `spec`.
    ///
    /// - missing: a fresh document is built from `spec` and saved;
    /// - incomplete: missing keys are filled and the document re-saved;
    /// - corrupt: the file is moved to `<file>.corrupt`, defaults are saved
    ///   in its place, and the condition is reported in the status.
    ///
    /// Other read failures and any write failure are returned as errors.
    pub fn load_or_create(
        &self,
        path: &Path,
        spec: &RequiredFields,
    ) -> Result<LoadOutcome, DocumentError> {
        match self.load(path) {
            Ok(mut document) => {
                let filled = reconcile_in_place(&mut document, spec);
                if filled.is_empty() {
                    return Ok(LoadOutcome {
                        document,
                        status: LoadStatus::Loaded,
                    });
                }
                tracing::debug!(path = %path.display(), filled = ?filled, "document completed with defaults");
                self.save(path, &document)?;
                Ok(LoadOutcome {
                    document,
                    status: LoadStatus::Repaired { filled },
                })
            }
            Err(DocumentError::NotFound { .. }) => {
                let mut document = AttributeMap::new();
                reconcile_in_place(&mut document, spec);
                self.save(path, &document)?;
                tracing::info!(path = %path.display(), "document created");
                Ok(LoadOutcome {
                    document,
                    status: LoadStatus::Created,
                })
            }
            Err(DocumentError::Corrupt { reason, .. }) => {
                let mut document = AttributeMap::new();
                reconcile_in_place(&mut document, spec);
                let preserved = self.set_aside(path, &reason)?;
                if preserved.is_some() {
                    self.save(path, &document)?;
                }
                Ok(LoadOutcome {
                    document,
                    status: LoadStatus::Recovered { reason, preserved },
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Load a canvas sibling document.
    ///
    /// A missing canvas is created empty; a corrupt one is set aside like a
    /// main document.
    pub fn load_canvas(&self, path: &Path) -> Result<LoadOutcome<CanvasDocument>, DocumentError> {
        match read_json::<CanvasDocument>(path) {
            Ok(document) => Ok(LoadOutcome {
                document,
                status: LoadStatus::Loaded,
            }),
            Err(DocumentError::NotFound { .. }) => {
                let document = CanvasDocument::default();
                self.save_canvas(path, &document)?;
                Ok(LoadOutcome {
                    document,
                    status: LoadStatus::Created,
                })
            }
            Err(DocumentError::Corrupt { reason, .. }) => {
                let document = CanvasDocument::default();
                let preserved = self.set_aside(path, &reason)?;
                if preserved.is_some() {
                    self.save_canvas(path, &document)?;
                }
                Ok(LoadOutcome {
                    document,
                    status: LoadStatus::Recovered { reason, preserved },
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn save_canvas(&self, path: &Path, canvas: &CanvasDocument) -> Result<(), DocumentError> {
        write_json(path, canvas)?;
        tracing::debug!(path = %path.display(), strokes = canvas.len(), "canvas saved");
        Ok(())
    }

    /// Move a corrupt file out of the way so defaults can be written without
    /// destroying it. Picks the first free name among `<file>.corrupt`,
    /// `<file>.corrupt.1`, ...
    fn set_aside(&self, path: &Path, reason: &str) -> Result<Option<PathBuf>, DocumentError> {
        let mut target = corrupt_path(path, 0);
        let mut attempt = 0;
        while target.exists() {
            attempt += 1;
            target = corrupt_path(path, attempt);
        }
        match fs::rename(path, &target) {
            Ok(()) => {
                tracing::warn!(
                    path = %path.display(),
                    preserved = %target.display(),
                    reason,
                    "corrupt document replaced by defaults"
                );
                Ok(Some(target))
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    reason,
                    "corrupt document could not be moved aside; using defaults in memory"
                );
                Ok(None)
            }
        }
    }
}

fn corrupt_path(path: &Path, attempt: u32) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(CORRUPT_SUFFIX);
    if attempt > 0 {
        name.push(format!(".{attempt}"));
    }
    path.with_file_name(name)
}

/// Escape characters that are not safe in a file name.
///
/// Path separators, characters reserved on common filesystems, control
/// characters and `%` itself become `%XX` per UTF-8 byte, so distinct titles
/// always map to distinct names.
///
/// A stem never ends in `_canvas`: the underscore of such a suffix is escaped
/// as `%5F`, which keeps document names apart from canvas sibling names.
#[must_use]
pub fn escape_file_stem(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        let unsafe_char = matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%')
            || ch.is_control();
        if unsafe_char {
            let mut buf = [0_u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        } else {
            out.push(ch);
        }
    }
    if out.ends_with(CANVAS_SUFFIX) {
        let at = out.len() - CANVAS_SUFFIX.len();
        out.replace_range(at..=at, "%5F");
    }
    out
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::InvalidData => DocumentError::Corrupt {
            path: path.to_path_buf(),
            reason: "content is not valid UTF-8".to_owned(),
        },
        _ => DocumentError::io(path, err),
    })?;
    serde_json::from_str(&text).map_err(|err| DocumentError::Corrupt {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DocumentError> {
    ensure_parent_dir(path)?;
    let content = serde_json::to_string_pretty(value).map_err(|source| DocumentError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write_bytes(path, content.as_bytes()).map_err(|err| DocumentError::io(path, err))
}

fn ensure_parent_dir(path: &Path) -> Result<(), DocumentError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|err| DocumentError::io(parent, err))
        }
        _ => Ok(()),
    }
}

/// Write through a temp file in the destination directory, then rename.
fn atomic_write_bytes(path: &Path, data: &[u8]) -> io::Result<()> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_name = format!(
        ".tmp-{}-{seq}-{}",
        std::process::id(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let tmp_path = parent.join(tmp_name);
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_data()?;
    drop(file);
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Stroke;
    use crate::schema::panel_fields;
    use serde_json::json;

    fn codec() -> (tempfile::TempDir, DocumentCodec) {
        let dir = tempfile::tempdir().unwrap();
        let codec = DocumentCodec::new(dir.path());
        (dir, codec)
    }

    fn spec() -> RequiredFields {
        panel_fields(PanelKind::Character, "Bob")
    }

    #[test]
    fn paths_follow_category_layout() {
        let codec = DocumentCodec::new("/story");
        assert_eq!(codec.settings_path(), PathBuf::from("/story/settings.json"));
        assert_eq!(
            codec.document_path(PanelKind::Character, "Bob"),
            PathBuf::from("/story/characters/Bob.json")
        );
        assert_eq!(
            codec.canvas_path(PanelKind::Map, "North"),
            PathBuf::from("/story/world_building/maps/North_canvas.json")
        );
    }

    #[test]
    fn escaping_keeps_names_inside_the_category() {
        assert_eq!(escape_file_stem("a/b"), "a%2Fb");
        assert_eq!(escape_file_stem("100%"), "100%25");
        assert_ne!(escape_file_stem("a/b"), escape_file_stem("a%2Fb"));
        let codec = DocumentCodec::new("/story");
        let path = codec.document_path(PanelKind::Note, "../../etc/passwd");
        assert_eq!(path.parent(), Some(Path::new("/story/notes")));
    }

    #[test]
    fn document_and_canvas_names_never_collide() {
        let codec = DocumentCodec::new("/story");
        assert_eq!(escape_file_stem("Sketch_canvas"), "Sketch%5Fcanvas");
        assert_eq!(escape_file_stem("Sketch_canvas_"), "Sketch_canvas_");
        assert_ne!(
            codec.document_path(PanelKind::Canvas, "Sketch_canvas"),
            codec.canvas_path(PanelKind::Canvas, "Sketch")
        );
        assert_ne!(
            codec.document_path(PanelKind::Map, "Sketch%5Fcanvas"),
            codec.document_path(PanelKind::Map, "Sketch_canvas")
        );
        assert_eq!(
            codec.canvas_path(PanelKind::Canvas, "Sketch_canvas"),
            PathBuf::from("/story/canvases/Sketch%5Fcanvas_canvas.json")
        );
    }

    #[test]
    fn panel_document_is_never_read_as_a_canvas() {
        let (_dir, codec) = codec();
        let path = codec.canvas_path(PanelKind::Canvas, "Sketch");
        let mut doc = AttributeMap::new();
        reconcile_in_place(&mut doc, &panel_fields(PanelKind::Canvas, "Other"));
        codec.save(&path, &doc).unwrap();

        let outcome = codec.load_canvas(&path).unwrap();
        let LoadStatus::Recovered { preserved: Some(aside), .. } = &outcome.status else {
            panic!("expected recovery, got {:?}", outcome.status);
        };
        assert!(outcome.document.is_empty());
        assert_eq!(codec.load(aside).unwrap(), doc);
    }

    #[test]
    fn missing_document_is_created_and_saved() {
        let (_dir, codec) = codec();
        let path = codec.document_path(PanelKind::Character, "Bob");
        let outcome = codec.load_or_create(&path, &spec()).unwrap();
        assert_eq!(outcome.status, LoadStatus::Created);
        assert_eq!(outcome.document["pin_location"], json!("left"));
        assert_eq!(codec.load(&path).unwrap(), outcome.document);

        let again = codec.load_or_create(&path, &spec()).unwrap();
        assert_eq!(again.status, LoadStatus::Loaded);
    }

    #[test]
    fn incomplete_document_is_repaired_and_written_back() {
        let (_dir, codec) = codec();
        let path = codec.document_path(PanelKind::Character, "Bob");
        let mut partial = AttributeMap::new();
        partial.insert("title".into(), json!("Bob"));
        partial.insert("age".into(), json!("41"));
        codec.save(&path, &partial).unwrap();

        let outcome = codec.load_or_create(&path, &spec()).unwrap();
        let LoadStatus::Repaired { filled } = &outcome.status else {
            panic!("expected repair, got {:?}", outcome.status);
        };
        assert!(filled.contains(&"color".to_owned()));
        assert!(!filled.contains(&"age".to_owned()));
        assert_eq!(outcome.document["age"], json!("41"));
        assert_eq!(codec.load(&path).unwrap(), outcome.document);
    }

    #[test]
    fn corrupt_document_is_preserved_and_replaced() {
        let (_dir, codec) = codec();
        let path = codec.document_path(PanelKind::Character, "Bob");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let outcome = codec.load_or_create(&path, &spec()).unwrap();
        assert!(outcome.was_recovered());
        let LoadStatus::Recovered { preserved: Some(aside), .. } = &outcome.status else {
            panic!("expected preserved copy, got {:?}", outcome.status);
        };
        assert_eq!(fs::read_to_string(aside).unwrap(), "{ not json");
        assert_eq!(codec.load(&path).unwrap(), outcome.document);

        fs::write(&path, "[1, 2]").unwrap();
        let second = codec.load_or_create(&path, &spec()).unwrap();
        let LoadStatus::Recovered { preserved: Some(aside2), reason } = &second.status else {
            panic!("expected preserved copy, got {:?}", second.status);
        };
        assert!(reason.contains("array"), "{reason}");
        assert_ne!(aside, aside2);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let (dir, codec) = codec();
        let path = codec.settings_path();
        codec.save(&path, &AttributeMap::new()).unwrap();
        codec.save(&path, &AttributeMap::new()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["settings.json"]);
    }

    #[test]
    fn remove_and_rename_report_missing_files() {
        let (_dir, codec) = codec();
        let a = codec.document_path(PanelKind::Note, "a");
        let b = codec.document_path(PanelKind::Note, "b");
        assert!(!codec.remove(&a).unwrap());
        assert!(!codec.rename(&a, &b).unwrap());
        codec.save(&a, &AttributeMap::new()).unwrap();
        assert!(codec.rename(&a, &b).unwrap());
        assert!(!a.exists());
        assert!(codec.remove(&b).unwrap());
    }

    #[test]
    fn canvas_is_created_then_reloaded() {
        let (_dir, codec) = codec();
        let path = codec.canvas_path(PanelKind::Canvas, "Board");
        let first = codec.load_canvas(&path).unwrap();
        assert_eq!(first.status, LoadStatus::Created);
        assert!(first.document.is_empty());

        let mut canvas = first.document;
        canvas.push(Stroke {
            points: vec![[1.0, 2.0]],
            color: "blue".into(),
            width: 3.0,
        });
        codec.save_canvas(&path, &canvas).unwrap();
        let loaded = codec.load_canvas(&path).unwrap();
        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.document, canvas);
    }

    #[test]
    fn error_kinds_classify() {
        let (_dir, codec) = codec();
        let err = codec.load(&codec.settings_path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentNotFound);
        assert_eq!(err.path(), codec.settings_path());
    }
}
