//! Private scratch workspace on RAM-backed storage.
//!
//! The workspace is a per-user directory under an ephemeral root (`/dev/shm` by
//! default) that holds one scratch file per session. Both the directory and the
//! file must carry exactly owner-only permissions; requesting the mode at
//! creation is not trusted, the bits are read back and compared.

use crate::constants::{
    CRYPTO_EXTENSIONS, PASSWD_BUFFER_LIMIT, SCRATCH_FALLBACK_NAME, SCRATCH_FILE_PERMISSIONS,
    SCRATCH_RANDOM_LEN, WORKSPACE_DIR_PERMISSIONS, WORKSPACE_DIR_SUFFIX,
};
use crate::errors::{AppResult, WorkspaceError};
use std::ffi::CStr;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the workspace lives and whose it is.
///
/// Passed explicitly so nothing reads process-wide state during provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Ephemeral storage root, e.g. `/dev/shm`.
    pub root: PathBuf,
    /// Login name used to derive the directory name.
    pub user: String,
}

impl WorkspaceConfig {
    pub fn new(root: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            user: user.into(),
        }
    }

    /// The deterministic workspace directory for this user.
    ///
    /// ```
    /// use gpgedit::crypto::WorkspaceConfig;
    /// use std::path::Path;
    ///
    /// let config = WorkspaceConfig::new("/dev/shm", "alice");
    /// assert_eq!(config.directory(), Path::new("/dev/shm/alice-gpgedit"));
    /// ```
    pub fn directory(&self) -> PathBuf {
        self.root.join(format!("{}{}", self.user, WORKSPACE_DIR_SUFFIX))
    }
}

/// Resolve the invoking user's name for the workspace directory.
///
/// Looks up the real uid in the password database. The environment is not
/// consulted. Falls back to `uid<N>` when there is no entry or the name is not
/// a plain path component.
pub fn current_user_name() -> String {
    let uid = real_uid();
    passwd_name(uid)
        .filter(|name| is_safe_component(name))
        .unwrap_or_else(|| format!("uid{}", uid))
}

fn passwd_name(uid: libc::uid_t) -> Option<String> {
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: all-zero is a valid `passwd` (null pointers and zero ids).
        let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
        let mut found: *mut libc::passwd = std::ptr::null_mut();

        // SAFETY: `buf` outlives every pointer getpwuid_r stores in `entry`,
        // and its length is passed alongside it.
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut entry, buf.as_mut_ptr(), buf.len(), &mut found)
        };

        if rc == libc::ERANGE && buf.len() < PASSWD_BUFFER_LIMIT {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || found.is_null() || entry.pw_name.is_null() {
            debug!("No password database entry for uid {}", uid);
            return None;
        }

        // SAFETY: pw_name is a NUL-terminated string inside `buf`.
        let name = unsafe { CStr::from_ptr(entry.pw_name) };
        return name.to_str().ok().map(str::to_string);
    }
}

fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn real_uid() -> u32 {
    // SAFETY: getuid(2) cannot fail and touches no memory.
    unsafe { libc::getuid() }
}

/// The target's base name with a known crypto extension removed.
///
/// ```
/// use gpgedit::crypto::workspace::root_name;
/// use std::path::Path;
///
/// assert_eq!(root_name(Path::new("/home/alice/notes.gpg")), "notes");
/// assert_eq!(root_name(Path::new("notes.txt.asc")), "notes.txt");
/// assert_eq!(root_name(Path::new("notes.txt")), "notes.txt");
/// ```
pub fn root_name(target: &Path) -> String {
    let stripped = match target.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if CRYPTO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => {
            target.file_stem()
        }
        _ => target.file_name(),
    };

    stripped
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| SCRATCH_FALLBACK_NAME.to_string())
}

/// A provisioned workspace directory and the scratch file created in it.
#[derive(Debug)]
pub struct SecureWorkspace {
    dir: PathBuf,
    scratch: Option<PathBuf>,
}

impl SecureWorkspace {
    /// Create (or reuse) the workspace directory and verify it is private.
    ///
    /// # Errors
    ///
    /// - `WorkspaceError::Create` if the directory can't be created or inspected
    /// - `WorkspaceError::NotADirectory` if the path is a symlink or a file
    /// - `WorkspaceError::ForeignOwner` if another uid owns it
    /// - `WorkspaceError::PermissionMismatch` if its mode is not exactly `0o700`
    pub fn provision(config: &WorkspaceConfig) -> AppResult<Self> {
        let dir = config.directory();

        DirBuilder::new()
            .recursive(true)
            .mode(WORKSPACE_DIR_PERMISSIONS)
            .create(&dir)
            .map_err(|source| WorkspaceError::Create {
                path: dir.clone(),
                source,
            })?;

        let metadata = fs::symlink_metadata(&dir).map_err(|source| WorkspaceError::Create {
            path: dir.clone(),
            source,
        })?;
        if !metadata.file_type().is_dir() {
            return Err(WorkspaceError::NotADirectory { path: dir }.into());
        }

        let uid = real_uid();
        if metadata.uid() != uid {
            return Err(WorkspaceError::ForeignOwner {
                path: dir,
                owner: metadata.uid(),
                expected: uid,
            }
            .into());
        }

        check_permissions(&dir, metadata.permissions().mode(), WORKSPACE_DIR_PERMISSIONS)?;
        debug!("Workspace directory ready: {:?}", dir);

        Ok(Self { dir, scratch: None })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The scratch file, once created.
    pub fn scratch(&self) -> Option<&Path> {
        self.scratch.as_deref()
    }

    /// Create an empty, uniquely named scratch file for `target`.
    ///
    /// The file is created with `O_EXCL` and mode `0o600`, then its mode is read
    /// back. Nothing is written to it here.
    ///
    /// # Errors
    ///
    /// - `WorkspaceError::ScratchCreate` if the file can't be created or inspected
    /// - `WorkspaceError::PermissionMismatch` if its mode is not exactly `0o600`
    pub fn create_scratch_file(&mut self, target: &Path) -> AppResult<PathBuf> {
        let random = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}-{}", &random[..SCRATCH_RANDOM_LEN], root_name(target));
        let path = self.dir.join(name);

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(SCRATCH_FILE_PERMISSIONS)
            .open(&path)
            .map_err(|source| WorkspaceError::ScratchCreate {
                path: path.clone(),
                source,
            })?;
        // Recorded before the check so a mismatch still gets cleaned up.
        self.scratch = Some(path.clone());

        let metadata = fs::symlink_metadata(&path).map_err(|source| {
            WorkspaceError::ScratchCreate {
                path: path.clone(),
                source,
            }
        })?;
        check_permissions(&path, metadata.permissions().mode(), SCRATCH_FILE_PERMISSIONS)?;

        debug!("Scratch file created: {:?}", path);
        Ok(path)
    }

    /// Delete the scratch file, then the directory if nothing else is left in it.
    ///
    /// Another session may still be using the directory, in which case it stays.
    pub fn cleanup(mut self) -> AppResult<()> {
        self.remove_contents()
    }

    fn remove_contents(&mut self) -> AppResult<()> {
        if let Some(scratch) = self.scratch.take() {
            match fs::remove_file(&scratch) {
                Ok(()) => debug!("Removed scratch file {:?}", scratch),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        match fs::remove_dir(&self.dir) {
            Ok(()) => debug!("Removed workspace directory {:?}", self.dir),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) if e.raw_os_error() == Some(libc::ENOTEMPTY) => {
                debug!("Workspace {:?} still in use, leaving it", self.dir);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Give up ownership of the scratch file without deleting it.
    pub fn keep_scratch(mut self) -> Option<PathBuf> {
        self.scratch.take()
    }
}

impl Drop for SecureWorkspace {
    fn drop(&mut self) {
        if self.scratch.is_some() {
            if let Err(e) = self.remove_contents() {
                warn!("Failed to clean up workspace {:?}: {}", self.dir, e);
            }
        }
    }
}

fn check_permissions(path: &Path, mode: u32, expected: u32) -> AppResult<()> {
    let actual = mode & 0o7777;
    if actual != expected {
        return Err(WorkspaceError::PermissionMismatch {
            path: path.to_path_buf(),
            actual,
            expected,
        }
        .into());
    }
    Ok(())
}
