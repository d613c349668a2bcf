use std::fmt;

/// What a pull did to the local branch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PullOutcome {
    #[default]
    UpToDate,
    FastForward,
    /// Diverged histories were joined with a merge commit.
    Merged,
    /// The branch tracks nothing; there was nothing to pull from.
    NoUpstream,
    /// The merge was aborted; the working copy is as before the pull.
    Conflict { files: Vec<String> },
}

impl PullOutcome {
    /// Whether the local branch now contains the upstream branch.
    pub fn is_integrated(&self) -> bool {
        matches!(self, Self::UpToDate | Self::FastForward | Self::Merged)
    }
}

impl fmt::Display for PullOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::FastForward => write!(f, "fast-forward"),
            Self::Merged => write!(f, "merged"),
            Self::NoUpstream => write!(f, "no upstream"),
            Self::Conflict { files } => write!(f, "conflict in {}", files.join(", ")),
        }
    }
}

/// What a push did to the remote branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Nothing moved; the remote already had every commit.
    UpToDate,
    FastForward,
    /// The remote branch was created.
    NewBranch,
    /// The remote refused the update, typically because it has diverged.
    Rejected { reason: String },
    /// The local branch has no upstream configured.
    NoUpstream,
    Error { message: String },
}

impl PushOutcome {
    /// Whether local commits are now on the remote.
    pub fn is_pushed(&self) -> bool {
        matches!(self, Self::FastForward | Self::NewBranch)
    }
}

impl fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::FastForward => write!(f, "fast-forward"),
            Self::NewBranch => write!(f, "new branch"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
            Self::NoUpstream => write!(f, "no upstream"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}
