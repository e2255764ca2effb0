// ABOUTME: File-backed record store of connection profiles keyed by `user@host`.
// ABOUTME: Every mutation rewrites the whole JSON document on disk.

mod error;
mod profile;
mod selection;

pub use error::{Result, StoreError};
pub use profile::{Profile, ProfileError};
pub use selection::Selection;

use crate::types::StorageKey;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Profiles loaded from a single JSON file.
///
/// The table is a `HashMap`, so iteration order is unspecified and differs
/// between runs. [`ProfileStore::get_by_name`] returns whichever matching
/// record the scan reaches first, while [`ProfileStore::delete_by_name`]
/// removes every match.
///
/// The file is not locked. Two invocations that mutate the same database
/// concurrently race on the full rewrite and the last writer wins.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: HashMap<StorageKey, Profile>,
}

impl ProfileStore {
    /// Load the store from `path`, creating an empty database if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let profiles = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("creating empty database at {}", path.display());
                let store = Self {
                    path,
                    profiles: HashMap::new(),
                };
                store.persist()?;
                return Ok(store);
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        Ok(Self { path, profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Snapshot of every record, in no particular order.
    pub fn all(&self) -> Vec<&Profile> {
        self.profiles.values().collect()
    }

    /// Every record sorted ascending by name. Indices shown by `list` refer to this order.
    pub fn sorted(&self) -> Vec<&Profile> {
        let mut profiles = self.all();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    pub fn get(&self, key: &StorageKey) -> Option<&Profile> {
        self.profiles.get(key)
    }

    /// First record whose name matches, under unordered iteration.
    pub fn get_by_name(&self, name: &str) -> Option<&Profile> {
        self.profiles.values().find(|p| p.name == name)
    }

    /// Resolve a picker selection. `Quit` and `Empty` never resolve.
    pub fn select(&self, selection: &Selection) -> Option<&Profile> {
        match selection {
            Selection::Index(index) => self.sorted().get(*index).copied(),
            Selection::Name(name) => self.get_by_name(name),
            Selection::Quit | Selection::Empty => None,
        }
    }

    /// Keys of other slots already using this profile's name.
    pub fn name_conflicts(&self, profile: &Profile) -> Vec<StorageKey> {
        let own_key = profile.storage_key();
        let mut keys: Vec<_> = self
            .profiles
            .iter()
            .filter(|(key, p)| p.name == profile.name && **key != own_key)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Insert or overwrite the record at `user@host`, then rewrite the file.
    pub fn save(&mut self, profile: Profile) -> Result<()> {
        self.profiles.insert(profile.storage_key(), profile);
        self.persist()
    }

    /// Validated insert used by `add`: refuses to overwrite an existing key unless `force` is set.
    ///
    /// Only a key collision is checked. A second profile with an existing
    /// name under a different key is accepted.
    pub fn insert(&mut self, profile: Profile, force: bool) -> Result<()> {
        profile.validate()?;
        let key = profile.storage_key();
        if !force && self.profiles.contains_key(&key) {
            return Err(StoreError::Exists(key));
        }
        self.save(profile)
    }

    /// Remove every record with this name and rewrite the file. Returns how many were removed.
    pub fn delete_by_name(&mut self, name: &str) -> Result<usize> {
        let before = self.profiles.len();
        self.profiles.retain(|_, p| p.name != name);
        let removed = before - self.profiles.len();
        self.persist()?;
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.profiles).map_err(StoreError::Encode)?;
        write_atomic(&self.path, json.as_bytes()).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Write to a sibling temp file, fsync, then rename over the target.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}
