use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, RepoResult};
use crate::outcome::{PullOutcome, PushOutcome};
use crate::repo::VersionedRepo;

/// Number of times each mutating operation was invoked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub add: usize,
    pub unstage: usize,
    pub commit: usize,
    pub pull: usize,
    pub push: usize,
    pub push_set_upstream: usize,
}

/// An in-memory [`VersionedRepo`] with scripted pull and push outcomes.
///
/// Files live in a real directory (`workdir`); history and remote exist
/// only as counters. Scripted outcomes are consumed in order, after which
/// the fallback outcome repeats.
#[derive(Clone, Debug)]
pub struct ScriptedRepo {
    workdir: PathBuf,
    bare: bool,
    dirty: bool,
    untracked: Vec<String>,
    remote: Option<String>,
    reachable: bool,
    branch: String,
    pushes: VecDeque<PushOutcome>,
    push_fallback: PushOutcome,
    pulls: VecDeque<PullOutcome>,
    pull_fallback: PullOutcome,
    set_upstream: PushOutcome,
    failing_add: Option<usize>,
    staged: Vec<PathBuf>,
    commits: Vec<String>,
    calls: CallCounts,
}

impl ScriptedRepo {
    /// A healthy repository whose pushes fast-forward and pulls are no-ops.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            bare: false,
            dirty: false,
            untracked: Vec::new(),
            remote: Some("origin".into()),
            reachable: true,
            branch: "main".into(),
            pushes: VecDeque::new(),
            push_fallback: PushOutcome::FastForward,
            pulls: VecDeque::new(),
            pull_fallback: PullOutcome::UpToDate,
            set_upstream: PushOutcome::NewBranch,
            failing_add: None,
            staged: Vec::new(),
            commits: Vec::new(),
            calls: CallCounts::default(),
        }
    }

    pub fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn with_untracked(mut self, files: &[&str]) -> Self {
        self.untracked = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn without_remote(mut self) -> Self {
        self.remote = None;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Outcomes for successive `push` calls.
    pub fn script_push(mut self, outcomes: impl IntoIterator<Item = PushOutcome>) -> Self {
        self.pushes.extend(outcomes);
        self
    }

    /// Outcome for every `push` once the script is exhausted.
    pub fn push_fallback(mut self, outcome: PushOutcome) -> Self {
        self.push_fallback = outcome;
        self
    }

    /// Outcomes for successive `pull` calls.
    pub fn script_pull(mut self, outcomes: impl IntoIterator<Item = PullOutcome>) -> Self {
        self.pulls.extend(outcomes);
        self
    }

    pub fn set_upstream_outcome(mut self, outcome: PushOutcome) -> Self {
        self.set_upstream = outcome;
        self
    }

    /// Make the `n`th call to `add` (counting from 1) fail.
    pub fn fail_add_at(mut self, n: usize) -> Self {
        self.failing_add = Some(n);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    /// Paths staged since the last commit.
    pub fn staged(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Commit messages, oldest first.
    pub fn commits(&self) -> &[String] {
        &self.commits
    }
}

impl VersionedRepo for ScriptedRepo {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_bare(&self) -> RepoResult<bool> {
        Ok(self.bare)
    }

    fn is_dirty(&self) -> RepoResult<bool> {
        Ok(self.dirty)
    }

    fn untracked_files(&self) -> RepoResult<Vec<String>> {
        Ok(self.untracked.clone())
    }

    fn has_remote(&self) -> RepoResult<bool> {
        Ok(self.remote.is_some())
    }

    fn remote_reachable(&self) -> RepoResult<bool> {
        Ok(self.remote.is_some() && self.reachable)
    }

    fn active_branch(&self) -> RepoResult<String> {
        Ok(self.branch.clone())
    }

    fn remote_name(&self) -> RepoResult<Option<String>> {
        Ok(self.remote.clone())
    }

    fn add(&mut self, paths: &[PathBuf]) -> RepoResult<()> {
        self.calls.add += 1;
        if self.failing_add == Some(self.calls.add) {
            return Err(RepoError::Command {
                command: "add".into(),
                status: "exit status: 128".into(),
                stderr: "scripted failure".into(),
            });
        }
        self.staged.extend_from_slice(paths);
        Ok(())
    }

    fn unstage(&mut self, paths: &[PathBuf]) -> RepoResult<()> {
        self.calls.unstage += 1;
        self.staged.retain(|staged| !paths.contains(staged));
        Ok(())
    }

    fn commit(&mut self, message: &str) -> RepoResult<()> {
        self.calls.commit += 1;
        self.staged.clear();
        self.commits.push(message.to_string());
        Ok(())
    }

    fn pull(&mut self) -> RepoResult<PullOutcome> {
        self.calls.pull += 1;
        Ok(self
            .pulls
            .pop_front()
            .unwrap_or_else(|| self.pull_fallback.clone()))
    }

    fn push(&mut self) -> RepoResult<PushOutcome> {
        self.calls.push += 1;
        Ok(self
            .pushes
            .pop_front()
            .unwrap_or_else(|| self.push_fallback.clone()))
    }

    fn push_set_upstream(&mut self) -> RepoResult<PushOutcome> {
        self.calls.push_set_upstream += 1;
        Ok(self.set_upstream.clone())
    }
}
