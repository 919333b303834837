//! Registered users, persisted with file locking.
//!
//! This is the local stand-in for the identity service: it hands out owner
//! identifiers and answers whether one is known. Credentials are not kept.

use crate::lock::LockFile;
use crate::{Error, OwnerId, Result, User};
use chrono::NaiveDateTime;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Lookup of known owners
pub trait UserDirectory {
    fn find(&self, owner: &OwnerId) -> Result<Option<User>>;

    /// Fail with [`Error::NotFound`] unless `owner` is registered
    fn require(&self, owner: &OwnerId) -> Result<User> {
        self.find(owner)?
            .ok_or_else(|| Error::NotFound(format!("user {}", owner)))
    }
}

/// All registered users, in registration order
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct UserRegistry {
    pub users: Vec<User>,
}

impl UserDirectory for UserRegistry {
    fn find(&self, owner: &OwnerId) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| &u.id == owner).cloned())
    }
}

impl UserRegistry {
    /// Register a new user. Emails are unique, compared case-insensitively.
    pub fn register(&mut self, name: &str, email: &str, now: NaiveDateTime) -> Result<User> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(Error::Other("name and email are required".into()));
        }
        if self.find_by_email(email).is_ok() {
            return Err(Error::Conflict(format!("email {} is already in use", email)));
        }

        let user = User {
            id: OwnerId::generate(),
            name: name.to_string(),
            email: email.to_string(),
            registered_at: now,
        };
        self.users.push(user.clone());
        tracing::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Result<&User> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| Error::NotFound(format!("user with email {}", email)))
    }

    /// Load the registry with a shared lock
    ///
    /// Returns an empty registry if the file doesn't exist. A corrupt
    /// registry is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No user registry at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let registry: UserRegistry = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded {} users from {:?}", registry.users.len(), path);
        Ok(registry)
    }

    /// Save the registry atomically
    ///
    /// Writes to a locked temp file, syncs it and renames it over the
    /// original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "registry path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved user registry to {:?}", path);
        Ok(())
    }

    /// Load, modify and save the registry in one step
    ///
    /// Holds the registry's exclusive lock throughout, so concurrent updates
    /// apply one after another.
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserRegistry) -> Result<T>,
    {
        let _lock = LockFile::exclusive(path)?;
        let mut registry = Self::load(path)?;
        let out = f(&mut registry)?;
        registry.save(path)?;
        Ok(out)
    }
}
