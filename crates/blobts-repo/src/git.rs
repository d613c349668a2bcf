use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, warn};

use crate::error::{RepoError, RepoResult};
use crate::outcome::{PullOutcome, PushOutcome};
use crate::repo::VersionedRepo;

const UPSTREAM: &str = "@{upstream}";

/// A git working copy driven through the `git` executable.
#[derive(Clone, Debug)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`.
    ///
    /// For a working copy the root is resolved with `rev-parse
    /// --show-toplevel`; a bare repository keeps `path` as given so that
    /// [`VersionedRepo::is_bare`] can report it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let probe = Self { workdir: path.clone() };
        probe.git_ok(&["rev-parse", "--git-dir"])?;
        if probe.is_bare()? {
            return Ok(probe);
        }
        let toplevel = probe.git_ok(&["rev-parse", "--show-toplevel"])?;
        Ok(Self {
            workdir: PathBuf::from(toplevel),
        })
    }

    /// Clone `url` into `path` and open the new working copy.
    pub fn clone_from(url: &str, path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let target = path.display().to_string();
        let args = ["clone", "--quiet", url, target.as_str()];
        debug!(args = ?args, "git");
        let output = Command::new("git").args(args).output()?;
        if !output.status.success() {
            return Err(command_error(&args, &output));
        }
        Self::open(path)
    }

    fn git(&self, args: &[&str]) -> RepoResult<Output> {
        debug!(workdir = %self.workdir.display(), args = ?args, "git");
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?)
    }

    /// Run git and return trimmed stdout, failing on a non-zero exit.
    fn git_ok(&self, args: &[&str]) -> RepoResult<String> {
        let output = self.git(args)?;
        if !output.status.success() {
            return Err(command_error(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a git predicate: exit 0 is true, exit 1 is false.
    fn git_test(&self, args: &[&str]) -> RepoResult<bool> {
        let output = self.git(args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(command_error(args, &output)),
        }
    }

    fn upstream(&self) -> RepoResult<Option<String>> {
        let output = self.git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", UPSTREAM])?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    fn remotes(&self) -> RepoResult<Vec<String>> {
        let out = self.git_ok(&["remote"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    fn conflicted_files(&self) -> RepoResult<Vec<String>> {
        let out = self.git_ok(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    fn run_push(&self, args: &[&str]) -> RepoResult<PushOutcome> {
        let output = self.git(args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(outcome) = parse_push_porcelain(&stdout) {
            return Ok(outcome);
        }
        if output.status.success() {
            return Ok(PushOutcome::UpToDate);
        }
        Ok(PushOutcome::Error {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl VersionedRepo for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn is_bare(&self) -> RepoResult<bool> {
        Ok(self.git_ok(&["rev-parse", "--is-bare-repository"])? == "true")
    }

    fn is_dirty(&self) -> RepoResult<bool> {
        let status = self.git_ok(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(!status.is_empty())
    }

    fn untracked_files(&self) -> RepoResult<Vec<String>> {
        let out = self.git_ok(&["ls-files", "--others", "--exclude-standard"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    fn has_remote(&self) -> RepoResult<bool> {
        Ok(!self.remotes()?.is_empty())
    }

    fn remote_reachable(&self) -> RepoResult<bool> {
        let Some(remote) = self.remote_name()? else {
            return Ok(false);
        };
        let output = self.git(&["ls-remote", "--heads", &remote])?;
        if !output.status.success() {
            warn!(
                %remote,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "remote did not answer"
            );
        }
        Ok(output.status.success())
    }

    fn active_branch(&self) -> RepoResult<String> {
        self.git_ok(&["symbolic-ref", "--short", "HEAD"])
    }

    fn remote_name(&self) -> RepoResult<Option<String>> {
        let branch = self.active_branch()?;
        let configured = self.git(&["config", "--get", &format!("branch.{branch}.remote")])?;
        if configured.status.success() {
            let name = String::from_utf8_lossy(&configured.stdout).trim().to_string();
            if !name.is_empty() {
                return Ok(Some(name));
            }
        }
        let remotes = self.remotes()?;
        if remotes.iter().any(|r| r == "origin") {
            return Ok(Some("origin".to_string()));
        }
        Ok(remotes.into_iter().next())
    }

    fn add(&mut self, paths: &[PathBuf]) -> RepoResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        args.extend(rendered.iter().map(String::as_str));
        self.git_ok(&args).map(drop)
    }

    fn unstage(&mut self, paths: &[PathBuf]) -> RepoResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["rm", "--cached", "--quiet", "--ignore-unmatch", "--"];
        let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        args.extend(rendered.iter().map(String::as_str));
        self.git_ok(&args).map(drop)
    }

    fn commit(&mut self, message: &str) -> RepoResult<()> {
        self.git_ok(&["commit", "--quiet", "-m", message]).map(drop)
    }

    fn pull(&mut self) -> RepoResult<PullOutcome> {
        let Some(upstream) = self.upstream()? else {
            return Ok(PullOutcome::NoUpstream);
        };
        let Some(remote) = self.remote_name()? else {
            return Ok(PullOutcome::NoUpstream);
        };
        self.git_ok(&["fetch", "--quiet", &remote])?;

        if self.git_test(&["merge-base", "--is-ancestor", UPSTREAM, "HEAD"])? {
            return Ok(PullOutcome::UpToDate);
        }
        if self.git_test(&["merge-base", "--is-ancestor", "HEAD", UPSTREAM])? {
            self.git_ok(&["merge", "--quiet", "--ff-only", UPSTREAM])?;
            return Ok(PullOutcome::FastForward);
        }

        let merge = self.git(&["merge", "--quiet", "--no-edit", UPSTREAM])?;
        if merge.status.success() {
            return Ok(PullOutcome::Merged);
        }
        let files = self.conflicted_files()?;
        warn!(%upstream, files = ?files, "merge conflict; aborting merge");
        self.git_ok(&["merge", "--abort"])?;
        Ok(PullOutcome::Conflict { files })
    }

    fn push(&mut self) -> RepoResult<PushOutcome> {
        if self.upstream()?.is_none() {
            return Ok(PushOutcome::NoUpstream);
        }
        self.run_push(&["push", "--porcelain"])
    }

    fn push_set_upstream(&mut self) -> RepoResult<PushOutcome> {
        let remote = self.remote_name()?.ok_or(RepoError::NoRemote)?;
        let branch = self.active_branch()?;
        self.run_push(&["push", "--porcelain", "--set-upstream", &remote, &branch])
    }
}

fn command_error(args: &[&str], output: &Output) -> RepoError {
    RepoError::Command {
        command: args.join(" "),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Interpret the first ref line of `git push --porcelain` output.
///
/// Ref lines are `<flag>\t<from>:<to>\t<summary>`.
fn parse_push_porcelain(stdout: &str) -> Option<PushOutcome> {
    stdout.lines().find_map(|line| {
        let mut fields = line.splitn(3, '\t');
        let flag = fields.next()?;
        let _refs = fields.next()?;
        let summary = fields.next().unwrap_or_default().trim();
        match flag {
            " " | "+" => Some(PushOutcome::FastForward),
            "*" => Some(PushOutcome::NewBranch),
            "=" => Some(PushOutcome::UpToDate),
            "!" => Some(PushOutcome::Rejected {
                reason: summary.trim_matches(|c| c == '[' || c == ']').to_string(),
            }),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porcelain_fast_forward() {
        let out = "To /tmp/remote.git\n \trefs/heads/main:refs/heads/main\t3f2a1b0..9c8d7e6\nDone\n";
        assert_eq!(parse_push_porcelain(out), Some(PushOutcome::FastForward));
    }

    #[test]
    fn porcelain_new_branch() {
        let out = "To /tmp/remote.git\n*\trefs/heads/main:refs/heads/main\t[new branch]\nDone\n";
        assert_eq!(parse_push_porcelain(out), Some(PushOutcome::NewBranch));
    }

    #[test]
    fn porcelain_up_to_date() {
        let out = "To /tmp/remote.git\n=\trefs/heads/main:refs/heads/main\t[up to date]\nDone\n";
        assert_eq!(parse_push_porcelain(out), Some(PushOutcome::UpToDate));
    }

    #[test]
    fn porcelain_rejected() {
        let out = "To /tmp/remote.git\n!\trefs/heads/main:refs/heads/main\t[rejected] (fetch first)\nDone\n";
        match parse_push_porcelain(out) {
            Some(PushOutcome::Rejected { reason }) => assert!(reason.contains("fetch first")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn porcelain_without_ref_lines() {
        assert_eq!(parse_push_porcelain("To /tmp/remote.git\nDone\n"), None);
        assert_eq!(parse_push_porcelain(""), None);
    }

    #[test]
    fn clone_and_inspect() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let remote = root.path().join("remote.git");
        let init = Command::new("git")
            .args(["init", "--quiet", "--bare"])
            .arg(&remote)
            .output()
            .unwrap();
        assert!(init.status.success());

        let work = root.path().join("work");
        let mut repo = GitCli::clone_from(&remote.display().to_string(), &work).unwrap();
        assert!(!repo.is_bare().unwrap());
        assert!(!repo.is_dirty().unwrap());
        assert!(repo.untracked_files().unwrap().is_empty());
        assert!(repo.has_remote().unwrap());
        assert_eq!(repo.remote_name().unwrap().as_deref(), Some("origin"));
        assert!(repo.remote_reachable().unwrap());

        std::fs::write(work.join("new.01"), b"x").unwrap();
        assert_eq!(repo.untracked_files().unwrap(), vec!["new.01".to_string()]);

        let staged = [PathBuf::from("new.01")];
        repo.add(&staged).unwrap();
        assert!(repo.is_dirty().unwrap());
        repo.unstage(&staged).unwrap();
        std::fs::remove_file(work.join("new.01")).unwrap();
        assert!(!repo.is_dirty().unwrap());
        assert!(repo.untracked_files().unwrap().is_empty());

        let bare = GitCli::open(&remote).unwrap();
        assert!(bare.is_bare().unwrap());
    }

    #[test]
    fn open_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let err = GitCli::open(dir.path()).unwrap_err();
        assert!(matches!(err, RepoError::Command { .. }));
    }
}
