//! The acting identity
//!
//! Authentication happens elsewhere; this crate only needs to know who is
//! acting. The identity is remembered between runs in the user's config
//! directory, next to nothing else.

use std::fs::{self, DirBuilder, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::Error;

/// Who is voting and posting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    username: String,
}

impl Identity {
    /// An identity for `username`, which must not be blank
    pub fn new<S: AsRef<str>>(username: S) -> Result<Self, Error> {
        match username.as_ref().trim() {
            "" => Err(Error::InvalidIdentity),
            username => Ok(Identity {
                username: username.to_string(),
            }),
        }
    }

    /// Username sent along with posts
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// File backed store of the current identity
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Store at an explicit path
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        IdentityStore { path: path.into() }
    }

    /// Store in the user's config directory
    pub fn open_default() -> Result<Self, Error> {
        let mut path = config::config_dir()?;
        path.push("identity.json");
        Ok(IdentityStore::new(path))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored identity, `None` if nobody is logged in
    pub fn load(&self) -> Result<Option<Identity>, Error> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = BufReader::new(File::open(&self.path)?);
        let identity = serde_json::from_reader(file)?;
        Ok(Some(identity))
    }

    /// Remember `identity` for later runs
    pub fn save(&self, identity: &Identity) -> Result<(), Error> {
        let tmp_path = self.path.with_extension("tmp");

        // Ensure the directory the identity file is stored in exists
        let dir = self.path.parent().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "unable to find parent dir of identity file",
            ))
        })?;
        if !dir.exists() {
            DirBuilder::new().recursive(true).create(dir)?;
        }

        {
            // Write out the file entirely
            let tmp_file = File::create(&tmp_path)?;
            serde_json::to_writer(tmp_file, identity)?;
        }

        // Move into place atomically
        debug!("saving identity to {}", self.path.display());
        fs::rename(tmp_path, &self.path).map_err(Error::from)
    }

    /// Forget the stored identity
    pub fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_new() {
        assert_eq!(Identity::new("  ana ").unwrap().username(), "ana");
        assert!(matches!(Identity::new("   "), Err(Error::InvalidIdentity)));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("nested").join("identity.json"));

        assert_eq!(store.load().unwrap(), None);

        let identity = Identity::new("ana").unwrap();
        store.save(&identity).unwrap();
        assert_eq!(store.load().unwrap(), Some(identity));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }
}
