use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("repository at {0} is bare; a working copy is required")]
    Bare(PathBuf),

    #[error("repository at {0} has uncommitted changes")]
    Dirty(PathBuf),

    #[error("repository has untracked files: {}", .0.join(", "))]
    HasUntrackedFiles(Vec<String>),

    #[error("repository has no remote")]
    NoRemote,

    #[error("remote {remote} is unreachable: {reason}")]
    RemoteUnreachable { remote: String, reason: String },

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("`git {command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;
