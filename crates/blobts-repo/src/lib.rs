//! Version-control collaborator for blobts.
//!
//! The store talks to its repository only through [`VersionedRepo`]:
//! health queries, staging, committing, and the pull/push outcomes the
//! store's retry protocol reacts to. [`GitCli`] drives a real git working
//! copy through the `git` executable; [`ScriptedRepo`] replays scripted
//! outcomes and counts calls.

pub mod error;
pub mod git;
pub mod outcome;
pub mod repo;
pub mod scripted;

pub use error::{RepoError, RepoResult};
pub use git::GitCli;
pub use outcome::{PullOutcome, PushOutcome};
pub use repo::VersionedRepo;
pub use scripted::{CallCounts, ScriptedRepo};
