use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

/// Error that occurs when a path cannot be used as a Unix domain socket.
#[derive(Debug, thiserror::Error)]
pub enum SocketPathError {
    #[error("cannot access socket `{path}`: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{path}` exists but is not a socket")]
    NotASocket { path: PathBuf },
}

/// Checks that `path` exists and is a Unix domain socket.
///
/// Connecting to a missing socket fails with a bare `NotFound`; checking
/// up front lets the caller report a misconfigured endpoint instead.
///
/// # Errors
///
/// Returns [`SocketPathError::Inaccessible`] if the path cannot be inspected and
/// [`SocketPathError::NotASocket`] if it names something else.
///
/// # Example
/// ```no_run
/// # use docker_metrics::fsutil;
/// fsutil::ensure_socket("/var/run/docker.sock")?;
/// # Ok::<(), fsutil::SocketPathError>(())
/// ```
pub fn ensure_socket(path: impl AsRef<Path>) -> Result<(), SocketPathError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|source| SocketPathError::Inaccessible {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(SocketPathError::NotASocket {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
