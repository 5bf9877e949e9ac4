use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};

use super::model::PolicyDocument;
use crate::error::HardkitError;

/// File-backed policy document. Every call goes back to disk; nothing is cached.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the built-in policy if no document exists yet.
    ///
    /// Returns `true` when the defaults were written. An existing file is
    /// never touched, whatever its content.
    pub fn ensure_defaults(&self) -> Result<bool, HardkitError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| HardkitError::file(parent, source))?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(source) => return Err(HardkitError::file(&self.path, source)),
        };

        let content = render_json(&PolicyDocument::defaults().as_value())?;
        file.write_all(content.as_bytes())
            .map_err(|source| HardkitError::file(&self.path, source))?;
        log::info!("Wrote default policy to {}", self.path.display());
        Ok(true)
    }

    /// Read and parse the whole document
    pub fn load(&self) -> Result<PolicyDocument, HardkitError> {
        let value = read_json(&self.path)?;
        PolicyDocument::from_value(value).ok_or_else(|| HardkitError::PolicyNotObject {
            path: self.path.clone(),
        })
    }

    /// Copy the current document to `destination`
    pub fn backup(&self, destination: &Path) -> Result<(), HardkitError> {
        copy_json(&self.path, destination)
    }

    /// Replace the current document with the one at `source`.
    ///
    /// Only JSON well-formedness is checked; missing sections surface later
    /// in the actions that need them.
    pub fn restore(&self, source: &Path) -> Result<(), HardkitError> {
        copy_json(source, &self.path)
    }
}

fn copy_json(from: &Path, to: &Path) -> Result<(), HardkitError> {
    let value = read_json(from)?;
    let content = render_json(&value)?;
    fs::write(to, content).map_err(|source| HardkitError::file(to, source))?;
    log::info!("Copied policy {} -> {}", from.display(), to.display());
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, HardkitError> {
    let content = fs::read_to_string(path).map_err(|source| HardkitError::PolicyRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| HardkitError::PolicyParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print with four-space indentation
pub(crate) fn render_json(value: &Value) -> Result<String, HardkitError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| HardkitError::Io(e.into()))?;
    buf.push(b'\n');
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, policy::model::FirewallAction};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PolicyStore {
        PolicyStore::new(dir.path().join("config").join("default_rules.json"))
    }

    #[test]
    fn ensure_defaults_creates_directory_and_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.ensure_defaults().unwrap());

        let policy = store.load().unwrap();
        assert_eq!(policy, PolicyDocument::defaults());
        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("    \"unnecessary_services\""));
    }

    #[test]
    fn ensure_defaults_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{\"custom\": true}").unwrap();

        assert!(!store.ensure_defaults().unwrap());
        assert!(!store.ensure_defaults().unwrap());
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "{\"custom\": true}"
        );
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = store_in(&dir).load().unwrap_err();
        assert!(matches!(err, HardkitError::PolicyRead { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn load_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let store = PolicyStore::new(dir.path().join("rules.json"));
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, HardkitError::PolicyParse { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn load_rejects_non_object_document() {
        let dir = TempDir::new().unwrap();
        let store = PolicyStore::new(dir.path().join("rules.json"));
        fs::write(store.path(), "[1, 2, 3]").unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            HardkitError::PolicyNotObject { .. }
        ));
    }

    #[test]
    fn backup_then_restore_reproduces_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_defaults().unwrap();
        let original = store.load().unwrap();

        let backup = dir.path().join("backup.json");
        store.backup(&backup).unwrap();

        fs::write(store.path(), "{\"unnecessary_services\": []}").unwrap();
        assert_ne!(store.load().unwrap(), original);

        store.restore(&backup).unwrap();
        assert_eq!(store.load().unwrap(), original);
        assert_eq!(
            store.load().unwrap().firewall_rules().unwrap()[0].action,
            FirewallAction::Allow
        );
    }

    #[test]
    fn restore_accepts_partial_documents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_defaults().unwrap();

        let source = dir.path().join("partial.json");
        fs::write(&source, r#"{"unnecessary_services": ["cups"]}"#).unwrap();
        store.restore(&source).unwrap();

        let policy = store.load().unwrap();
        assert_eq!(policy.unnecessary_services().unwrap(), vec!["cups"]);
        assert!(policy.firewall_rules().is_err());
    }

    #[test]
    fn restore_of_malformed_backup_keeps_current_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_defaults().unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let source = dir.path().join("broken.json");
        fs::write(&source, "{\"firewall_rules\": [").unwrap();

        assert!(store.restore(&source).is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn backup_without_policy_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.backup(&dir.path().join("out.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
