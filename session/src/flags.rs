//! Capability flags granted by the operator as marker files.
//!
//! A flag is the existence of a zero-content file under the session
//! directory. The gate only ever reads them; creating and removing flags
//! is the operator's job, done outside this system.

use std::path::Path;

/// One grantable capability, identified by its marker file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    FastMode,
    EditsApproved,
    CommitsApproved,
    ProdDeploy,
    DbMigrate,
    TaskDeploy,
    MobileRelease,
}

impl Capability {
    /// Marker file name under the session directory.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::FastMode => "FAST_MODE",
            Self::EditsApproved => "ALLOW_EDITS",
            Self::CommitsApproved => "ALLOW_COMMITS",
            Self::ProdDeploy => "ALLOW_PROD_DEPLOY",
            Self::DbMigrate => "ALLOW_DB_MIGRATE",
            Self::TaskDeploy => "ALLOW_TRIGGER_DEPLOY",
            Self::MobileRelease => "ALLOW_MOBILE_RELEASE",
        }
    }
}

/// Snapshot of the granted capabilities.
///
/// Loaded fresh at the start of each invocation; a missing session
/// directory simply means nothing is granted.
#[derive(Debug, Default, Clone)]
pub struct CapabilityFlags {
    pub fast_mode: bool,
    pub edits_approved: bool,
    pub commits_approved: bool,
    pub prod_deploy: bool,
    pub db_migrate: bool,
    pub task_deploy: bool,
    pub mobile_release: bool,
}

impl CapabilityFlags {
    #[must_use]
    pub fn load(session_dir: &Path) -> Self {
        let granted = |cap: Capability| session_dir.join(cap.marker()).exists();
        Self {
            fast_mode: granted(Capability::FastMode),
            edits_approved: granted(Capability::EditsApproved),
            commits_approved: granted(Capability::CommitsApproved),
            prod_deploy: granted(Capability::ProdDeploy),
            db_migrate: granted(Capability::DbMigrate),
            task_deploy: granted(Capability::TaskDeploy),
            mobile_release: granted(Capability::MobileRelease),
        }
    }

    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::FastMode => self.fast_mode,
            Capability::EditsApproved => self.edits_approved,
            Capability::CommitsApproved => self.commits_approved,
            Capability::ProdDeploy => self.prod_deploy,
            Capability::DbMigrate => self.db_migrate,
            Capability::TaskDeploy => self.task_deploy,
            Capability::MobileRelease => self.mobile_release,
        }
    }
}
