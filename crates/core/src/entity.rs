//! Entities: the declared outputs whose validity defines job completion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EntityError;

/// Outcome of examining one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The artifact exists and is well formed.
    Valid,

    /// The artifact is missing or malformed; the reason says which.
    Invalid(String),
}

impl Validation {
    /// Returns `true` for [`Validation::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A side-effectful output of a job, typically a file.
///
/// `validate` distinguishes an artifact that was examined and found
/// wanting (`Ok(Invalid)`) from one that could not be examined at all
/// (`Err`); callers must propagate the latter rather than fold it into
/// a done/not-done decision.
pub trait Entity: Send + Sync {
    /// Checks that the artifact exists and is well formed.
    fn validate(&self) -> Result<Validation, EntityError>;

    /// Fabricates a placeholder artifact, as during a mock run.
    fn mock(&self) -> Result<(), EntityError>;

    /// Deletes the artifact. Not an error if it never existed.
    fn remove(&self) -> Result<(), EntityError>;
}

/// A file whose existence marks a job as done.
#[derive(Debug, Clone)]
pub struct FileEntity {
    path: PathBuf,
}

impl FileEntity {
    /// Creates a file entity at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directories and returns the path, ready for
    /// a job to write to.
    pub fn prepare(&self) -> Result<&Path, EntityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| EntityError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(&self.path)
    }
}

impl Entity for FileEntity {
    fn validate(&self) -> Result<Validation, EntityError> {
        if self.path.exists() {
            Ok(Validation::Valid)
        } else {
            Ok(Validation::Invalid(format!(
                "file {} not found",
                self.path.display()
            )))
        }
    }

    fn mock(&self) -> Result<(), EntityError> {
        let path = self.prepare()?;
        fs::File::create(path)
            .map(|_| ())
            .map_err(|source| EntityError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn remove(&self) -> Result<(), EntityError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(EntityError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// A JSON file that must parse as an object carrying a declared set of
/// top-level keys.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    required_keys: Vec<String>,
}

impl JsonFile {
    /// Creates a JSON entity at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required_keys: Vec::new(),
        }
    }

    /// Declares keys the object must contain to validate.
    pub fn with_required_keys(mut self, keys: Vec<String>) -> Self {
        self.required_keys = keys;
        self
    }

    /// The file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> EntityError {
        EntityError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Entity for JsonFile {
    fn validate(&self) -> Result<Validation, EntityError> {
        if !self.path.exists() {
            return Ok(Validation::Invalid(format!(
                "file {} not found",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(err) => {
                return Ok(Validation::Invalid(format!(
                    "{} is not valid JSON: {}",
                    self.path.display(),
                    err
                )));
            }
        };
        let object = match value.as_object() {
            Some(object) => object,
            None => {
                return Ok(Validation::Invalid(format!(
                    "{} is not a JSON object",
                    self.path.display()
                )));
            }
        };
        for key in &self.required_keys {
            if !object.contains_key(key) {
                return Ok(Validation::Invalid(format!(
                    "{} is missing key '{}'",
                    self.path.display(),
                    key
                )));
            }
        }
        Ok(Validation::Valid)
    }

    fn mock(&self) -> Result<(), EntityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut object = serde_json::Map::new();
        for key in &self.required_keys {
            object.insert(key.clone(), serde_json::Value::Null);
        }
        let content = serde_json::to_string_pretty(&serde_json::Value::Object(object))
            .map_err(|err| EntityError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn remove(&self) -> Result<(), EntityError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_entity_validate_and_mock() {
        let dir = tempdir().unwrap();
        let entity = FileEntity::new(dir.path().join("data/7.hdf"));

        let checked = entity.validate().unwrap();
        assert!(matches!(checked, Validation::Invalid(_)));

        entity.mock().unwrap();
        assert!(entity.validate().unwrap().is_valid());
    }

    #[test]
    fn test_file_entity_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let entity = FileEntity::new(dir.path().join("out.txt"));

        entity.remove().unwrap();
        entity.mock().unwrap();
        entity.remove().unwrap();
        assert!(!entity.path().exists());
    }

    #[test]
    fn test_json_file_requires_keys() {
        let dir = tempdir().unwrap();
        let entity = JsonFile::new(dir.path().join("summary.json"))
            .with_required_keys(vec!["mean".to_string(), "count".to_string()]);

        std::fs::write(entity.path(), r#"{"mean": 0.5}"#).unwrap();
        assert!(matches!(
            entity.validate().unwrap(),
            Validation::Invalid(reason) if reason.contains("count")
        ));

        entity.mock().unwrap();
        assert!(entity.validate().unwrap().is_valid());
    }

    #[test]
    fn test_json_file_rejects_malformed_content() {
        let dir = tempdir().unwrap();
        let entity = JsonFile::new(dir.path().join("summary.json"));

        std::fs::write(entity.path(), "not json").unwrap();
        assert!(matches!(entity.validate().unwrap(), Validation::Invalid(_)));
    }
}
