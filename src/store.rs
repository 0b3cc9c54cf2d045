/*!
 * Loading and saving language banks.
 *
 * `BankStore` is the seam the session persists through. `JsonBankStore`
 * keeps one pretty-printed JSON file per bank under a project directory,
 * at the bank's own `file_path`.
 */

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::errors::StoreError;
use crate::model::LanguageBank;

/// Source and sink for the full bank set
pub trait BankStore: Send + Sync {
    /// Load every bank
    fn load(&self) -> Result<Vec<LanguageBank>, StoreError>;

    /// Persist every bank
    fn save(&self, banks: &[LanguageBank]) -> Result<(), StoreError>;
}

// @struct: Bank files stored as JSON in one directory tree
#[derive(Debug, Clone)]
pub struct JsonBankStore {
    root: PathBuf,
}

impl JsonBankStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // @resolves: Bank file location; only plain relative paths under the root
    fn bank_path(&self, bank: &LanguageBank) -> Result<PathBuf, StoreError> {
        let relative = Path::new(&bank.file_path);
        let plain = relative.components().next().is_some()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StoreError::OutsideProject(bank.file_path.clone()));
        }
        Ok(self.root.join(relative))
    }

    // @finds: Every .json file under the root, in path order
    fn bank_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.root.display().to_string(),
                source: e.into(),
            })?;
            let path = entry.path();
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"));
            if path.is_file() && is_json {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

impl BankStore for JsonBankStore {
    fn load(&self) -> Result<Vec<LanguageBank>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::MissingProject(self.root.display().to_string()));
        }

        let mut banks: Vec<LanguageBank> = Vec::new();
        for path in self.bank_files()? {
            let display = path.display().to_string();
            let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: display.clone(),
                source,
            })?;
            let bank: LanguageBank = serde_json::from_str(&content)
                .map_err(|source| StoreError::Format { path: display.clone(), source })?;

            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            if relative != Path::new(&bank.file_path) {
                return Err(StoreError::PathMismatch {
                    path: display,
                    file_path: bank.file_path,
                });
            }

            if banks.iter().any(|loaded| loaded.lang == bank.lang) {
                warn!("Skipping {}: language {} is already loaded", display, bank.lang);
                continue;
            }
            debug!("Loaded bank {} with {} scenes from {}", bank.lang, bank.scenes.len(), display);
            banks.push(bank);
        }
        Ok(banks)
    }

    fn save(&self, banks: &[LanguageBank]) -> Result<(), StoreError> {
        let targets = banks
            .iter()
            .map(|bank| self.bank_path(bank).map(|path| (bank, path)))
            .collect::<Result<Vec<_>, _>>()?;

        for (bank, path) in targets {
            let display = path.display().to_string();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
            let json = serde_json::to_string_pretty(bank)
                .map_err(|source| StoreError::Format { path: display.clone(), source })?;
            fs::write(&path, json).map_err(|source| StoreError::Io { path: display, source })?;
        }
        debug!("Saved {} banks to {}", banks.len(), self.root.display());
        Ok(())
    }
}
