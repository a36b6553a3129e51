//! Per-invocation project handle: config, store and preference file.

use anyhow::{Context as _, Result};
use lexis_core::config::{self, LEXIS_DIR, ProjectConfig};
use lexis_core::error::{ErrorCode, StoreError};
use lexis_core::model::{ANONYMOUS, Session};
use lexis_core::prefs::PrefStore;
use lexis_core::store::{RemoteStore, SqliteStore};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::output::CodedError;

/// Preference key holding the signed-in session token.
pub const SESSION_KEY: &str = "lexis_session";

pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub store: SqliteStore,
}

impl Project {
    /// Open the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns a `NotInitialized` error when `.lexis/` is missing, or the
    /// config/store open error.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.join(LEXIS_DIR).is_dir() {
            return Err(CodedError::new(
                ErrorCode::NotInitialized,
                format!("no {LEXIS_DIR}/ directory in {}", root.display()),
            )
            .into());
        }
        let config = config::load_project_config(root).map_err(|err| {
            anyhow::Error::new(CodedError::new(ErrorCode::ConfigParseError, format!("{err:#}")))
        })?;
        let store_path = config.store_path(root);
        let store = SqliteStore::open(&store_path)
            .with_context(|| format!("failed to open store {}", store_path.display()))?;
        debug!(store = %store_path.display(), "project opened");
        Ok(Self {
            root: root.to_path_buf(),
            config,
            store,
        })
    }

    pub fn prefs(&self) -> PrefStore {
        PrefStore::open(ProjectConfig::prefs_path(&self.root))
    }

    /// The current session, if a valid token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        let token: Option<String> = self.prefs().get(SESSION_KEY, None);
        match token {
            Some(token) => self.store.session(&token),
            None => Ok(None),
        }
    }

    /// Author tag for new rows: the session email or `anonymous`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub fn author(&self) -> Result<String, StoreError> {
        Ok(self
            .session()?
            .map_or_else(|| ANONYMOUS.to_string(), |s| s.email))
    }

    /// The admin session, or an `Unauthorized` error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unauthorized`] unless the configured admin is
    /// signed in.
    pub fn require_admin(&self) -> Result<Session, StoreError> {
        let admin = self.config.auth.admin_email.as_deref();
        match self.session()? {
            Some(session) if session.is_admin(admin) => Ok(session),
            Some(session) => Err(StoreError::Unauthorized(format!(
                "{} is not the admin account",
                session.email
            ))),
            None => Err(StoreError::Unauthorized("admin sign-in required".to_string())),
        }
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        &self.store
    }
}
