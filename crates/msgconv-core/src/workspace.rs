//! Scoped per-request workspace directories.
//!
//! Every request that carries an upload gets exactly one [`Workspace`]: a
//! uniquely named temporary directory holding the uploaded input and the
//! converted artifact. Removal is guaranteed by [`TempDir`]'s drop, so no
//! exit path (success, conversion failure, or handler fault) can leave a
//! directory behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::TRACING_TARGET_WORKSPACE;
use crate::error::Result;

/// Prefix for workspace directory names, so lingering directories are
/// attributable to this service.
const WORKSPACE_PREFIX: &str = "msgconv-";

/// Fallback name for uploads whose part declares no usable filename.
const DEFAULT_FILENAME: &str = "upload.msg";

/// Suffix appended to the input filename to derive the artifact name.
const ARTIFACT_SUFFIX: &str = ".eml";

/// An ephemeral, uniquely named directory holding all files for one
/// request's lifetime.
///
/// Dropping the workspace recursively removes the directory and
/// everything in it. On the success path ownership moves into the
/// response body stream, deferring removal until the artifact has been
/// fully written to the client.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a new workspace under the system temporary directory.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?;

        tracing::debug!(
            target: TRACING_TARGET_WORKSPACE,
            path = %dir.path().display(),
            "workspace created"
        );

        Ok(Self { dir })
    }

    /// Creates a new workspace under the given root directory.
    ///
    /// Used by tests that need to observe exactly which directories exist
    /// after a sequence of requests.
    pub fn create_in(root: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)?;

        Ok(Self { dir })
    }

    /// Returns the workspace directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the path at which an upload with the given declared
    /// filename is stored.
    ///
    /// The declared filename is attacker-controlled; only its final path
    /// component is used. See [`sanitize_filename`].
    pub fn input_path(&self, declared_filename: Option<&str>) -> PathBuf {
        self.dir.path().join(sanitize_filename(declared_filename))
    }

    /// Returns the path at which the converter is asked to write its
    /// output for the given input file.
    ///
    /// Derived deterministically as the input filename plus `.eml`, in
    /// the same directory.
    pub fn artifact_path(&self, input: &Path) -> PathBuf {
        let mut name: OsString = input
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| OsString::from(DEFAULT_FILENAME));
        name.push(ARTIFACT_SUFFIX);
        self.dir.path().join(name)
    }
}

/// Reduces a client-supplied filename to a safe path leaf.
///
/// Directory components (both `/` and `\` separated) are stripped, and
/// names that cannot name a file inside the workspace (`empty`, `.`,
/// `..`) fall back to a fixed default. This is the hardening over the
/// literal upstream behavior: a crafted filename must never escape the
/// workspace directory.
pub fn sanitize_filename(declared: Option<&str>) -> String {
    let Some(declared) = declared else {
        return DEFAULT_FILENAME.to_string();
    };

    let leaf = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(declared)
        .trim();

    if leaf.is_empty() || leaf == "." || leaf == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        leaf.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_is_removed_on_drop() -> crate::Result<()> {
        let root = tempfile::tempdir().unwrap();

        let workspace = Workspace::create_in(root.path())?;
        let path = workspace.path().to_path_buf();
        assert!(path.is_dir());

        std::fs::write(workspace.input_path(Some("a.msg")), b"payload").unwrap();
        drop(workspace);

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
        Ok(())
    }

    #[test]
    fn workspaces_are_unique_per_request() -> crate::Result<()> {
        let root = tempfile::tempdir().unwrap();

        let first = Workspace::create_in(root.path())?;
        let second = Workspace::create_in(root.path())?;

        assert_ne!(first.path(), second.path());
        Ok(())
    }

    #[test]
    fn input_path_stays_inside_workspace() -> crate::Result<()> {
        let workspace = Workspace::create()?;

        let path = workspace.input_path(Some("../../etc/passwd"));
        assert_eq!(path.parent(), Some(workspace.path()));
        assert_eq!(path.file_name().unwrap(), "passwd");
        Ok(())
    }

    #[test]
    fn artifact_path_appends_suffix() -> crate::Result<()> {
        let workspace = Workspace::create()?;

        let input = workspace.input_path(Some("mail.msg"));
        let artifact = workspace.artifact_path(&input);

        assert_eq!(artifact.parent(), Some(workspace.path()));
        assert_eq!(artifact.file_name().unwrap(), "mail.msg.eml");
        Ok(())
    }

    #[test]
    fn sanitize_strips_directory_components() {
        assert_eq!(sanitize_filename(Some("mail.msg")), "mail.msg");
        assert_eq!(sanitize_filename(Some("/tmp/mail.msg")), "mail.msg");
        assert_eq!(sanitize_filename(Some("../../mail.msg")), "mail.msg");
        assert_eq!(sanitize_filename(Some(r"C:\inbox\mail.msg")), "mail.msg");
    }

    #[test]
    fn sanitize_falls_back_on_unusable_names() {
        assert_eq!(sanitize_filename(None), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(Some("")), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(Some("   ")), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(Some("..")), DEFAULT_FILENAME);
        assert_eq!(sanitize_filename(Some("dir/..")), DEFAULT_FILENAME);
    }
}
