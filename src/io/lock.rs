use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory file lock serializing writes to one budget book.
///
/// Two `bt` invocations racing on the same draft would clobber each other's
/// edits; flock (Unix) keeps them sequential. Held for the duration of one
/// write command, released on drop.
pub struct BookLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another bt process may be writing")]
    Timeout { path: PathBuf },
}

impl BookLock {
    /// Acquire an advisory lock on the book directory, blocking up to
    /// `timeout` for a competing writer to finish.
    pub fn acquire(book_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = book_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateError {
                path: path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        while try_flock(&file).is_err() {
            if start.elapsed() >= timeout {
                return Err(LockError::Timeout { path });
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(BookLock { _file: file, path })
    }

    /// Acquire with the default 5 second timeout.
    pub fn acquire_default(book_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(book_dir, Duration::from_secs(5))
    }
}

impl Drop for BookLock {
    fn drop(&mut self) {
        // flock releases with the fd; the file itself is just litter.
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}
