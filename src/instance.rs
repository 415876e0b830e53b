//! Single-instance guard.
//!
//! A PID file marks the running launcher.  Starting a second one asks the
//! first to terminate and then exits itself, so invoking the launcher
//! while it is open closes it.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not signal running instance {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of [`acquire`].
#[derive(Debug)]
pub enum Acquired {
    /// We are the only instance; the lock is held until dropped.
    Locked(InstanceLock),
    /// Another instance was running and has been told to quit.
    ReplacedExisting(i32),
}

/// A held PID file.  Removed on [`release`](Self::release) or drop.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: i32,
    released: bool,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the PID file if it still names us.  Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if read_pid(&self.path) == Some(self.pid) {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!("released {}", self.path.display()),
                Err(e) => warn!("failed to remove {}: {}", self.path.display(), e),
            }
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Take the lock at `path`, or terminate the instance holding it.
pub fn acquire(path: &Path) -> Result<Acquired, InstanceError> {
    let io_err = |source| InstanceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let own = std::process::id() as i32;

    if let Some(pid) = read_pid(path) {
        if pid != own && is_alive(pid) {
            info!("instance {} is running, asking it to quit", pid);
            terminate(pid)?;
            remove_if_exists(path).map_err(io_err)?;
            return Ok(Acquired::ReplacedExisting(pid));
        }
        debug!("stale lock for pid {}", pid);
    }
    remove_if_exists(path).map_err(io_err)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, own.to_string()).map_err(io_err)?;
    debug!("locked {} for pid {}", path.display(), own);

    Ok(Acquired::Locked(InstanceLock {
        path: path.to_path_buf(),
        pid: own,
        released: false,
    }))
}

/// A positive PID from the file, if it holds one.
fn read_pid(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path)
        .ok()?
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|pid| *pid > 0)
}

fn is_alive(pid: i32) -> bool {
    // Signal 0 only checks for existence and permission.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

fn terminate(pid: i32) -> Result<(), InstanceError> {
    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        Ok(())
    } else {
        Err(InstanceError::Signal {
            pid,
            source: std::io::Error::last_os_error(),
        })
    }
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    fn locked(acquired: Acquired) -> InstanceLock {
        match acquired {
            Acquired::Locked(lock) => lock,
            other => panic!("expected lock, got {:?}", other),
        }
    }

    #[test]
    fn fresh_lock_writes_our_pid_and_release_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run/launchpop.lock");
        let mut lock = locked(acquire(&path).unwrap());
        assert_eq!(read_pid(&path), Some(std::process::id() as i32));
        lock.release();
        assert!(!path.exists());
        lock.release();
    }

    #[test]
    fn drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpop.lock");
        drop(locked(acquire(&path).unwrap()));
        assert!(!path.exists());
    }

    #[test]
    fn garbage_and_stale_files_are_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpop.lock");

        std::fs::write(&path, "not a pid").unwrap();
        let lock = locked(acquire(&path).unwrap());
        drop(lock);

        // Above the kernel's pid_max, so no such process.
        std::fs::write(&path, "2147483647").unwrap();
        let _lock = locked(acquire(&path).unwrap());
        assert_eq!(read_pid(&path), Some(std::process::id() as i32));
    }

    #[test]
    fn own_pid_is_not_treated_as_another_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpop.lock");
        std::fs::write(&path, std::process::id().to_string()).unwrap();
        let _lock = locked(acquire(&path).unwrap());
    }

    #[test]
    fn live_instance_is_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launchpop.lock");
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id() as i32;
        std::fs::write(&path, pid.to_string()).unwrap();

        match acquire(&path).unwrap() {
            Acquired::ReplacedExisting(p) => assert_eq!(p, pid),
            other => panic!("expected replacement, got {:?}", other),
        }
        assert!(!path.exists());
        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGTERM));
    }
}
