//! Settings persistence
//!
//! UI preferences live in `~/.lazyssh/settings.json`:
//!
//! ```json
//! {
//!   "sort_mode": "last_seen_desc"
//! }
//! ```
//!
//! Every save is a whole-document read-modify-write. Keys this version does
//! not know about are carried through untouched. The file is written to a
//! staging file next to it and renamed into place, so a reader sees either the
//! old or the new document.
//!
//! A missing file, an empty file, and an unknown `sort_mode` all mean "nothing
//! saved yet" and load as [`DEFAULT_SORT_MODE`]. Unreadable or malformed files
//! are reported to the caller; nothing here is logged except the warning when
//! no home directory can be found.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{LoadFailure, SettingsError};
use crate::sort_mode::SortMode;

pub const APP_DIR: &str = ".lazyssh";
pub const SETTINGS_FILE: &str = "settings.json";

/// Sort mode reported when nothing valid has been saved.
pub const DEFAULT_SORT_MODE: SortMode = SortMode::AliasAsc;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// On-disk preference document.
///
/// `sort_mode` is kept as the raw string so that a value this build cannot
/// parse degrades to the default instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_mode: Option<String>,
    /// Keys written by other versions.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// The stored sort mode, if it is set and valid.
    pub fn sort_mode(&self) -> Option<SortMode> {
        self.sort_mode.as_deref().and_then(SortMode::from_key)
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = Some(mode.as_str().to_string());
    }
}

/// Reads and writes the settings file at a fixed path.
///
/// Holds no cached state: every call goes back to disk. Concurrent saves from
/// several tasks can interleave and lose an update; callers serialize access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
    default_sort_mode: SortMode,
}

impl SettingsStore {
    /// Store rooted at the current user's home directory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoHomeDir`] when the home directory cannot be
    /// determined from the environment.
    pub fn from_home() -> Result<Self, SettingsError> {
        let home = home_dir().ok_or(SettingsError::NoHomeDir)?;
        Ok(Self::in_home(&home))
    }

    /// Store at `<home>/.lazyssh/settings.json`.
    pub fn in_home(home: &Path) -> Self {
        Self::at_path(home.join(APP_DIR).join(SETTINGS_FILE))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_sort_mode: DEFAULT_SORT_MODE,
        }
    }

    pub fn with_default_sort_mode(mut self, mode: SortMode) -> Self {
        self.default_sort_mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_sort_mode(&self) -> SortMode {
        self.default_sort_mode
    }

    /// Loads the saved sort mode.
    ///
    /// An absent or unrecognised value is not an error and yields the
    /// store's default.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadFailure`] carrying the default when the file cannot
    /// be read or is not a valid document.
    pub fn load_sort_mode(&self) -> Result<SortMode, LoadFailure> {
        match self.read_document() {
            Ok(document) => Ok(document.sort_mode().unwrap_or(self.default_sort_mode)),
            Err(source) => Err(LoadFailure {
                fallback: self.default_sort_mode,
                source,
            }),
        }
    }

    /// Persists `mode`, keeping every other key of the current document.
    ///
    /// # Errors
    ///
    /// Propagates read errors of the existing document (a malformed file is
    /// never overwritten) and any directory, serialization or write failure.
    pub fn save_sort_mode(&self, mode: SortMode) -> Result<(), SettingsError> {
        let mut document = self.read_document()?;
        document.set_sort_mode(mode);
        self.write_document(&document)
    }

    /// Reads the whole document.
    ///
    /// A missing or zero-length file reads as an empty document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] for failures other than "not found" and
    /// [`SettingsError::Malformed`] if the content is not a JSON object of
    /// the expected shape.
    pub fn read_document(&self) -> Result<Document, SettingsError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if data.is_empty() {
            return Ok(Document::default());
        }

        serde_json::from_slice(&data).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file with `document`.
    ///
    /// Creates the settings directory owner-only if needed, writes a staging
    /// file owner read/write only, then renames it over the settings file.
    /// A symlinked settings file is written through: the link target is
    /// replaced and the link itself stays.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Serialize`] if the document cannot be encoded
    /// and [`SettingsError::Io`] for any file system failure.
    pub fn write_document(&self, document: &Document) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let mut content = serde_json::to_vec_pretty(document).map_err(SettingsError::Serialize)?;
        content.push(b'\n');

        let target = write_target(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let staging = staging_path(&target);
        write_private_file(&staging, &content).map_err(|source| {
            let _ = fs::remove_file(&staging);
            SettingsError::Io {
                path: staging.clone(),
                source,
            }
        })?;

        fs::rename(&staging, &target).map_err(|source| {
            let _ = fs::remove_file(&staging);
            SettingsError::Io {
                path: target.clone(),
                source,
            }
        })
    }
}

/// Settings as seen by the rest of the application.
///
/// `Unavailable` stands in for a store that could not be built; its loads
/// report the default plus [`SettingsError::Unavailable`] and its saves fail
/// without touching the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settings {
    Ready(SettingsStore),
    Unavailable,
}

impl Settings {
    /// Opens the store under the user's home directory, or logs a warning and
    /// returns [`Settings::Unavailable`]. No file is touched.
    pub fn open() -> Self {
        match SettingsStore::from_home() {
            Ok(store) => Settings::Ready(store),
            Err(err) => {
                warn!(error = %err, "failed to determine home directory for settings");
                Settings::Unavailable
            }
        }
    }

    pub fn store(&self) -> Option<&SettingsStore> {
        match self {
            Settings::Ready(store) => Some(store),
            Settings::Unavailable => None,
        }
    }

    pub fn default_sort_mode(&self) -> SortMode {
        self.store().map_or(DEFAULT_SORT_MODE, SettingsStore::default_sort_mode)
    }

    /// See [`SettingsStore::load_sort_mode`].
    ///
    /// # Errors
    ///
    /// On an unavailable store, a [`LoadFailure`] wrapping
    /// [`SettingsError::Unavailable`].
    pub fn load_sort_mode(&self) -> Result<SortMode, LoadFailure> {
        match self {
            Settings::Ready(store) => store.load_sort_mode(),
            Settings::Unavailable => Err(LoadFailure {
                fallback: DEFAULT_SORT_MODE,
                source: SettingsError::Unavailable,
            }),
        }
    }

    /// The saved sort mode, or the default on any failure.
    pub fn sort_mode_or_default(&self) -> SortMode {
        self.load_sort_mode().unwrap_or_else(LoadFailure::into_fallback)
    }

    /// See [`SettingsStore::save_sort_mode`].
    ///
    /// # Errors
    ///
    /// [`SettingsError::Unavailable`] on an unavailable store, otherwise
    /// whatever the store reports.
    pub fn save_sort_mode(&self, mode: SortMode) -> Result<(), SettingsError> {
        match self {
            Settings::Ready(store) => store.save_sort_mode(mode),
            Settings::Unavailable => Err(SettingsError::Unavailable),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// The file a save replaces: the link target when `path` is a symlink.
///
/// A dangling link resolves to where it points, relative to its own directory.
fn write_target(path: &Path) -> io::Result<PathBuf> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(target),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let link = fs::read_link(path)?;
                Ok(match path.parent() {
                    Some(dir) => dir.join(link),
                    None => link,
                })
            }
            Err(e) => Err(e),
        },
        _ => Ok(path.to_path_buf()),
    }
}

/// Fixed name, so a staging file left by a crash is reused (truncated and
/// its mode reset) on the next save rather than accumulating.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(SETTINGS_FILE));
    name.push(".tmp");
    path.with_file_name(name)
}

fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)
}

fn write_private_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;

    // A leftover staging file keeps its old mode on open.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
    }

    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_home_uses_lazyssh_settings_json() {
        let store = SettingsStore::in_home(Path::new("/home/alice"));
        assert_eq!(store.path(), Path::new("/home/alice/.lazyssh/settings.json"));
        assert_eq!(store.default_sort_mode(), DEFAULT_SORT_MODE);
    }

    #[test]
    fn test_default_sort_mode_is_alias_ascending() {
        assert_eq!(DEFAULT_SORT_MODE, SortMode::AliasAsc);
    }

    #[test]
    fn test_write_target_of_regular_path_is_the_path() {
        let path = Path::new("/nonexistent/lazyssh/settings.json");
        assert_eq!(write_target(path).expect("resolve"), path);
    }

    #[test]
    fn test_staging_path_sits_next_to_settings_file() {
        let staging = staging_path(Path::new("/tmp/x/settings.json"));
        assert_eq!(staging, Path::new("/tmp/x/settings.json.tmp"));
    }

    #[test]
    fn test_empty_document_serializes_to_empty_object() {
        let json = serde_json::to_string(&Document::default()).expect("serialize");
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_document_keeps_unknown_keys() {
        // Arrange
        let raw = r#"{"sort_mode":"alias_desc","theme":"dark","columns":[1,2]}"#;

        // Act
        let mut doc: Document = serde_json::from_str(raw).expect("deserialize");
        doc.set_sort_mode(SortMode::LastSeenAsc);
        let value = serde_json::to_value(&doc).expect("serialize");

        // Assert
        assert_eq!(value["sort_mode"], "last_seen_asc");
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["columns"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_document_with_unknown_mode_has_no_sort_mode() {
        let doc: Document =
            serde_json::from_str(r#"{"sort_mode":"not-a-real-mode"}"#).expect("deserialize");
        assert_eq!(doc.sort_mode.as_deref(), Some("not-a-real-mode"));
        assert_eq!(doc.sort_mode(), None);
    }

    #[test]
    fn test_document_with_null_sort_mode_is_unset() {
        let doc: Document = serde_json::from_str(r#"{"sort_mode":null}"#).expect("deserialize");
        assert_eq!(doc.sort_mode, None);
    }

    #[test]
    fn test_non_string_sort_mode_is_a_shape_error() {
        let result: Result<Document, _> = serde_json::from_str(r#"{"sort_mode":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unavailable_load_returns_default_and_error() {
        // Act
        let failure = Settings::Unavailable
            .load_sort_mode()
            .expect_err("unavailable store must report an error");

        // Assert
        assert_eq!(failure.fallback, DEFAULT_SORT_MODE);
        assert!(matches!(failure.source, SettingsError::Unavailable));
        assert_eq!(Settings::Unavailable.sort_mode_or_default(), DEFAULT_SORT_MODE);
    }

    #[test]
    fn test_unavailable_save_is_rejected() {
        let result = Settings::Unavailable.save_sort_mode(SortMode::LastSeenDesc);
        assert!(matches!(result, Err(SettingsError::Unavailable)));
        assert_eq!(Settings::Unavailable.store(), None);
    }

    #[test]
    fn test_custom_default_is_used_for_fallback() {
        // Arrange: a path inside a directory that does not exist reads as empty
        let store = SettingsStore::at_path("/nonexistent/lazyssh/settings.json")
            .with_default_sort_mode(SortMode::LastSeenDesc);
        let settings = Settings::Ready(store);

        // Act / Assert
        assert_eq!(settings.default_sort_mode(), SortMode::LastSeenDesc);
        assert_eq!(settings.load_sort_mode().ok(), Some(SortMode::LastSeenDesc));
    }
}
