//! Asset pipeline errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to copy `{}` to `{}`", src.display(), dest.display())]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` is outside the asset root `{}`", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("failed to clean output directory `{}`", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove stale file `{}`", path.display())]
    Prune {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error on build record `{}`", path.display())]
    RecordIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("build record `{}` is malformed", path.display())]
    RecordParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("aborted")]
    Aborted,
}
