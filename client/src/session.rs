//! Application session and its persistence

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::models::{default_menu, has_capability, visible_menu, Capability, MenuEntry, Role, SessionUser};

use crate::error::{ClientError, ClientResult};

/// Who is operating the dashboard, passed explicitly to orchestrators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSession {
    pub user: SessionUser,
    pub role: Role,
}

impl AppSession {
    pub fn new(user: SessionUser, role: Role) -> Self {
        Self { user, role }
    }

    pub fn can(&self, capability: Capability) -> bool {
        has_capability(&self.role, capability)
    }

    /// Refuse an action the role does not grant
    pub fn require(&self, capability: Capability) -> ClientResult<()> {
        if self.can(capability) {
            return Ok(());
        }
        tracing::warn!(role = %self.role.name, flag = capability.flag(), "Capability missing");
        Err(ClientError::Validation(format!(
            "Your role ({}) does not allow this action",
            self.role.name
        )))
    }

    /// Name recorded as releaser/receiver on transfers
    pub fn actor_name(&self) -> String {
        self.user.name.clone()
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        visible_menu(&default_menu(), &self.role)
    }
}

/// The only place the session is serialized
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, `None` when nobody is signed in
    pub fn load(&self) -> ClientResult<Option<AppSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Session(format!("{}: {}", self.path.display(), e)))?;
        let session = serde_json::from_str(&raw)
            .map_err(|e| ClientError::Session(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &AppSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Session(format!("{}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Session(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| ClientError::Session(format!("{}: {}", self.path.display(), e)))?;
        tracing::debug!(path = %self.path.display(), user_id = session.user.user_id, "Session saved");
        Ok(())
    }

    /// Sign out
    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(format!("{}: {}", self.path.display(), e))),
        }
    }
}
