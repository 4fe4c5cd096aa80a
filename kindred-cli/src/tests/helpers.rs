//! Test helpers for building temporary databases and user profiles.

use super::*;
use camino::Utf8PathBuf;
use kindred_core::test_support::FixedClock;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::users::{PutUserConfig, execute_put_user};

/// A temporary workspace holding the database and profile files.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) store: StoreConfig,
    pub(super) clock: FixedClock,
}

impl Workspace {
    pub(super) fn new() -> Self {
        Self::with_ttl_seconds(Some(DEFAULT_TTL_SECONDS))
    }

    pub(super) fn with_ttl_seconds(ttl_seconds: Option<u64>) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let store = StoreConfig::from_options(Some(root.join("kindred.db")), ttl_seconds);
        Self {
            _dir: dir,
            root,
            store,
            clock: FixedClock::default(),
        }
    }

    /// Write `profile` to disk and return its path.
    pub(super) fn write_profile(&self, name: &str, profile: &Value) -> Utf8PathBuf {
        let path = self.root.join(format!("{name}.json"));
        std::fs::write(&path, profile.to_string()).expect("write profile");
        path
    }

    /// Store a user through the `put-user` command and return its output.
    pub(super) fn put_user(&self, handle: &str, movies: &[&str]) -> Value {
        let profile = json!({
            "name": handle.to_uppercase(),
            "handle": handle,
            "interests": { "movie": movies },
        });
        let config = PutUserConfig {
            profile: self.write_profile(handle, &profile),
            store: self.store.clone(),
        };
        let mut out = Vec::new();
        execute_put_user(&config, &self.clock, &mut out).expect("put-user succeeds");
        parse_output(&out)
    }
}

pub(super) fn parse_output(out: &[u8]) -> Value {
    serde_json::from_slice(out).expect("command output is JSON")
}
