use std::path::{Path, PathBuf};

use crate::error::RepoResult;
use crate::outcome::{PullOutcome, PushOutcome};

/// A version-controlled working copy with one remote.
///
/// Queries take `&self`; anything that changes the index, the history or
/// the remote takes `&mut self`.
pub trait VersionedRepo {
    /// Root of the working copy, where record files live.
    fn workdir(&self) -> &Path;

    fn is_bare(&self) -> RepoResult<bool>;

    /// Whether tracked files have uncommitted changes. Untracked files do
    /// not count.
    fn is_dirty(&self) -> RepoResult<bool>;

    /// Untracked, non-ignored files, relative to the working copy root.
    fn untracked_files(&self) -> RepoResult<Vec<String>>;

    fn has_remote(&self) -> RepoResult<bool>;

    fn remote_reachable(&self) -> RepoResult<bool>;

    fn active_branch(&self) -> RepoResult<String>;

    /// The remote pushes go to, if any.
    fn remote_name(&self) -> RepoResult<Option<String>>;

    /// Stage files for the next commit.
    fn add(&mut self, paths: &[PathBuf]) -> RepoResult<()>;

    /// Drop files from the index, leaving the working copy untouched.
    /// Paths that were never staged are ignored.
    fn unstage(&mut self, paths: &[PathBuf]) -> RepoResult<()>;

    fn commit(&mut self, message: &str) -> RepoResult<()>;

    fn pull(&mut self) -> RepoResult<PullOutcome>;

    fn push(&mut self) -> RepoResult<PushOutcome>;

    /// Push the active branch to the remote and make it the upstream.
    fn push_set_upstream(&mut self) -> RepoResult<PushOutcome>;
}
