use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Local, NaiveDateTime};
use log::{info, warn};

use crate::game_data::SaveState;

use super::engine;
use super::error::{CoreError, CoreErrorCode};
use super::types::{Attempt, MutationReport, MutationRequest, OperationMode};

pub const SAVE_FILE_PREFIX: &str = "SaveGameData_";
pub const SAVE_FILE_EXTENSION: &str = ".dat";
pub const BACKUP_FOLDER: &str = "Backups";
pub const TEMP_FILENAME: &str = "Temp.dat";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H-%M";

pub const NO_SAVES_FOUND: &str = "No saves found";
pub const SAVES_LIST_ERROR: &str = "Error loading saves list";
pub const NO_BACKUP: &str = "None. No files have been modified.";

pub const DEFAULT_SAVE_DIR: &str = "Saves";
pub const DEFAULT_MOD_SUBFOLDER: &str = "SVUtil";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Directory scanned by `list_saves` and used to resolve bare file names.
    pub save_dir: PathBuf,
    /// Folder, next to the save being written, that holds backups and the
    /// staging file.
    pub mod_subfolder: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            mod_subfolder: DEFAULT_MOD_SUBFOLDER.to_string(),
        }
    }
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Loads and saves game state, one operation at a time.
///
/// Every public operation takes the manager's guard first. A call that finds
/// the guard taken returns [`Attempt::Busy`] without touching anything.
pub struct SaveManager {
    config: ManagerConfig,
    busy: AtomicBool,
    last_backup: Mutex<Option<PathBuf>>,
    clock: Clock,
}

/// Held for the duration of one manager operation; releases on drop.
#[derive(Debug)]
pub struct OperationGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for SaveManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveManager")
            .field("config", &self.config)
            .field("busy", &self.is_busy())
            .field("last_backup", &self.last_backup())
            .finish_non_exhaustive()
    }
}

impl Default for SaveManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl SaveManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            busy: AtomicBool::new(false),
            last_backup: Mutex::new(None),
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Replaces the wall clock used to timestamp backups.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Option<OperationGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| OperationGuard { busy: &self.busy })
    }

    pub fn last_backup(&self) -> Option<PathBuf> {
        self.last_backup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The last backup path, or the "none" sentinel when the most recent save
    /// did not get as far as writing one.
    pub fn last_backup_display(&self) -> String {
        match self.last_backup() {
            Some(path) => path.display().to_string(),
            None => NO_BACKUP.to_string(),
        }
    }

    fn set_last_backup(&self, path: Option<PathBuf>) {
        *self
            .last_backup
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = path;
    }

    /// Resolves a bare file name against the save directory. Paths with a
    /// directory component are returned unchanged.
    pub fn resolve_save_path(&self, name: &Path) -> PathBuf {
        if name.is_absolute() || name.components().count() > 1 {
            name.to_path_buf()
        } else {
            self.config.save_dir.join(name)
        }
    }

    /// File names of the saves in the save directory, sorted.
    ///
    /// Never fails: an empty directory yields `[NO_SAVES_FOUND]` and an
    /// unreadable one yields `[SAVES_LIST_ERROR]`.
    pub fn list_saves(&self) -> Attempt<Vec<String>> {
        let Some(_guard) = self.try_acquire() else {
            warn!("list_saves skipped: another operation is running");
            return Attempt::Busy;
        };

        let saves = match save_file_names(&self.config.save_dir) {
            Ok(names) if names.is_empty() => vec![NO_SAVES_FOUND.to_string()],
            Ok(names) => names,
            Err(e) => {
                warn!(
                    "failed to list saves in {}: {e}",
                    self.config.save_dir.display()
                );
                vec![SAVES_LIST_ERROR.to_string()]
            }
        };
        Attempt::Completed(saves)
    }

    pub fn load(&self, path: &Path) -> Result<Attempt<SaveState>, CoreError> {
        let Some(_guard) = self.try_acquire() else {
            warn!("load of {} skipped: another operation is running", path.display());
            return Ok(Attempt::Busy);
        };

        if !path.exists() {
            return Err(CoreError::new(
                CoreErrorCode::NotFound,
                format!("save file {} does not exist", path.display()),
            ));
        }

        let bytes = fs::read(path).map_err(|e| CoreError::io("read", path, e))?;
        let state = decode_state(&bytes).map_err(|e| {
            CoreError::new(e.code, format!("{}: {}", path.display(), e.message))
        })?;
        info!("loaded {} ({} bytes)", path.display(), bytes.len());
        Ok(Attempt::Completed(state))
    }

    /// Writes `state` over the existing save at `path`.
    ///
    /// The current file is first copied to a timestamped backup, then the new
    /// state is staged in the temp file, then the temp file replaces the
    /// save. A failure at any step leaves the save as it was before that step.
    /// Returns the backup path.
    pub fn save(&self, state: &SaveState, path: &Path) -> Result<Attempt<PathBuf>, CoreError> {
        let Some(_guard) = self.try_acquire() else {
            warn!("save to {} skipped: another operation is running", path.display());
            return Ok(Attempt::Busy);
        };

        self.set_last_backup(None);
        if !path.is_file() {
            return Err(CoreError::new(
                CoreErrorCode::NotFound,
                format!("save file path {} does not exist", path.display()),
            ));
        }

        let backup_path = self.create_backup(path)?;
        self.set_last_backup(Some(backup_path.clone()));

        let temp_path = self.temp_path_for(path);
        write_temp_file(state, &temp_path)?;

        fs::copy(&temp_path, path).map_err(|e| CoreError::io("replace", path, e))?;
        fs::remove_file(&temp_path).map_err(|e| CoreError::io("remove", &temp_path, e))?;

        info!(
            "saved {} (backup at {})",
            path.display(),
            backup_path.display()
        );
        Ok(Attempt::Completed(backup_path))
    }

    pub fn remove_objects(
        &self,
        state: &mut SaveState,
        requests: &[MutationRequest],
    ) -> Attempt<MutationReport> {
        self.remove_or_replace(OperationMode::Remove, state, requests)
    }

    pub fn replace_objects(
        &self,
        state: &mut SaveState,
        requests: &[MutationRequest],
    ) -> Attempt<MutationReport> {
        self.remove_or_replace(OperationMode::Replace, state, requests)
    }

    pub fn remove_or_replace(
        &self,
        mode: OperationMode,
        state: &mut SaveState,
        requests: &[MutationRequest],
    ) -> Attempt<MutationReport> {
        let Some(_guard) = self.try_acquire() else {
            warn!("{} batch skipped: another operation is running", mode.as_str());
            return Attempt::Busy;
        };

        let report = engine::remove_or_replace(mode, state, requests);
        info!(
            "{} batch of {} requests: {} removed, {} replaced across {} containers",
            mode.as_str(),
            requests.len(),
            report.removed,
            report.replaced,
            report.containers_visited
        );
        Attempt::Completed(report)
    }

    /// `<save dir>/<mod subfolder>/Backups/<stem>_<yyyy-MM-dd--HH-mm>.dat`
    pub fn backup_path_for(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestamp = (self.clock)().format(BACKUP_TIMESTAMP_FORMAT);
        self.mod_dir_for(path)
            .join(BACKUP_FOLDER)
            .join(format!("{stem}_{timestamp}{SAVE_FILE_EXTENSION}"))
    }

    pub fn temp_path_for(&self, path: &Path) -> PathBuf {
        self.mod_dir_for(path).join(TEMP_FILENAME)
    }

    fn mod_dir_for(&self, path: &Path) -> PathBuf {
        path.parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.config.mod_subfolder)
    }

    fn create_backup(&self, path: &Path) -> Result<PathBuf, CoreError> {
        let backup_path = self.backup_path_for(path);
        let collision = || {
            warn!("backup {} already exists", backup_path.display());
            CoreError::new(
                CoreErrorCode::Collision,
                format!(
                    "backup {} already exists; wait a minute before saving again",
                    backup_path.display()
                ),
            )
        };

        if backup_path.exists() {
            return Err(collision());
        }
        if let Some(dir) = backup_path.parent() {
            fs::create_dir_all(dir).map_err(|e| CoreError::io("create", dir, e))?;
        }

        let mut source = File::open(path).map_err(|e| CoreError::io("open", path, e))?;
        let target = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&backup_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(collision()),
            Err(e) => return Err(CoreError::io("create", &backup_path, e)),
        };
        write_backup(&mut source, target, &backup_path)?;

        Ok(backup_path)
    }
}

// A partially written backup is deleted so it cannot pass for a recovery
// point or block a retry with a collision.
fn write_backup<R: Read>(
    source: &mut R,
    mut target: File,
    backup_path: &Path,
) -> Result<(), CoreError> {
    let written = io::copy(source, &mut target).and_then(|_| target.sync_all());
    if let Err(e) = written {
        drop(target);
        if let Err(remove_err) = fs::remove_file(backup_path) {
            warn!(
                "failed to remove partial backup {}: {remove_err}",
                backup_path.display()
            );
        }
        return Err(CoreError::io("write", backup_path, e));
    }
    Ok(())
}

pub fn encode_state(state: &SaveState) -> Result<Vec<u8>, CoreError> {
    bincode::serialize(state).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Serialize,
            format!("failed to serialize save data: {e}"),
        )
    })
}

pub fn decode_state(bytes: &[u8]) -> Result<SaveState, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::new(
            CoreErrorCode::Deserialize,
            "failed to load save file data: file is empty",
        ));
    }

    bincode::deserialize(bytes).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Deserialize,
            format!("failed to load save file data: {e}"),
        )
    })
}

/// Matches `SaveGameData_??.dat`.
pub fn is_save_file_name(name: &str) -> bool {
    name.strip_prefix(SAVE_FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(SAVE_FILE_EXTENSION))
        .is_some_and(|slot| slot.chars().count() == 2)
}

fn save_file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_save_file_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn write_temp_file(state: &SaveState, temp_path: &Path) -> Result<(), CoreError> {
    if let Some(dir) = temp_path.parent() {
        fs::create_dir_all(dir).map_err(|e| CoreError::io("create", dir, e))?;
    }
    if temp_path.exists() {
        fs::remove_file(temp_path).map_err(|e| CoreError::io("remove stale", temp_path, e))?;
    }

    let file = File::create(temp_path).map_err(|e| CoreError::io("create", temp_path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, state).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Serialize,
            format!("failed to serialize save data to {}: {e}", temp_path.display()),
        )
    })?;
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| CoreError::io("write", temp_path, e))
}
