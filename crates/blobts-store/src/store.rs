use std::path::{Path, PathBuf};

use blobts_codec::{NameCodec, NameError};
use blobts_pipeline::{BlobPipeline, CompressorRegistry};
use blobts_repo::{PullOutcome, PushOutcome, RepoError, VersionedRepo};
use blobts_time::{normalize, normalize_bound};
use blobts_types::{Endpoint, TimeInput, Timestamp, FORMAT_VERSION};
use rand::rngs::OsRng;
use tracing::{debug, error, info, warn};

use crate::config::StoreOptions;
use crate::error::{BlobError, StoreError, StoreResult};
use crate::records::Records;

/// A time-indexed blob store over a versioned working copy.
///
/// Writes take `&mut self`: the store assumes it is the only writer to the
/// working copy while a call runs.
#[derive(Debug)]
pub struct Store<R: VersionedRepo> {
    repo: R,
    codec: NameCodec,
    pipeline: BlobPipeline,
}

impl<R: VersionedRepo> Store<R> {
    /// Check the repository and set up the pipeline and name codec.
    ///
    /// Fails if the repository is bare, dirty, has untracked files, or has
    /// no reachable remote.
    pub fn open(repo: R, options: StoreOptions) -> StoreResult<Self> {
        options.validate()?;
        check_repo(&repo)?;
        let pipeline =
            BlobPipeline::from_config(&options.pipeline, &CompressorRegistry::with_builtins())?;
        let codec = NameCodec::new(options.encoding, options.nonce_bits);
        let suffix = codec.current_suffix()?;
        let store = Self {
            repo,
            codec,
            pipeline,
        };
        store.log_state(&suffix);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.repo.workdir()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    pub fn codec(&self) -> &NameCodec {
        &self.codec
    }

    pub fn pipeline(&self) -> &BlobPipeline {
        &self.pipeline
    }

    /// Add one record, commit, and push. Returns its canonical timestamp.
    pub fn add(&mut self, payload: &[u8], time: impl Into<TimeInput>) -> StoreResult<Timestamp> {
        let time = time.into();
        info!(len = payload.len(), time = %time, "adding record");
        let ts = self.normalize(&time)?;
        self.write_batch(&[(payload, ts)])?;
        self.commit_and_push(1)?;
        Ok(ts)
    }

    /// Add records pairwise from `payloads` and `times`, stopping at the
    /// shorter of the two, then commit once and push.
    ///
    /// Every time is normalized before anything is written. If a write
    /// fails, the files already written by this call are unstaged and
    /// removed so the working copy stays clean.
    pub fn add_many<P, T>(
        &mut self,
        payloads: impl IntoIterator<Item = P>,
        times: impl IntoIterator<Item = T>,
    ) -> StoreResult<Vec<Timestamp>>
    where
        P: AsRef<[u8]>,
        T: Into<TimeInput>,
    {
        let pending = payloads
            .into_iter()
            .zip(times)
            .map(|(payload, time)| Ok((payload, self.normalize(&time.into())?)))
            .collect::<StoreResult<Vec<_>>>()?;
        info!(count = pending.len(), "adding records");

        let batch: Vec<(&[u8], Timestamp)> = pending
            .iter()
            .map(|(payload, ts)| (payload.as_ref(), *ts))
            .collect();
        self.write_batch(&batch)?;
        if !batch.is_empty() {
            self.commit_and_push(batch.len())?;
        }
        info!(count = batch.len(), "added records");
        Ok(batch.into_iter().map(|(_, ts)| ts).collect())
    }

    /// [`add_many`](Self::add_many) with every record stamped now.
    pub fn add_many_now<P: AsRef<[u8]>>(
        &mut self,
        payloads: impl IntoIterator<Item = P>,
    ) -> StoreResult<Vec<Timestamp>> {
        self.add_many(payloads, std::iter::repeat(TimeInput::Now))
    }

    /// Records with timestamps between `start` and `end`, inclusive.
    ///
    /// An absent bound (or NaN seconds) is open-ended. If `start` is after
    /// `end` the same records come back newest first.
    pub fn get(
        &mut self,
        start: Option<TimeInput>,
        end: Option<TimeInput>,
        pull: bool,
    ) -> StoreResult<Records> {
        let lo = normalize_bound(start.as_ref(), Endpoint::NegInfinity)?;
        let hi = normalize_bound(end.as_ref(), Endpoint::PosInfinity)?;
        self.get_range(lo, hi, pull)
    }

    /// [`get`](Self::get) with already normalized bounds.
    pub fn get_range(&mut self, start: Endpoint, end: Endpoint, pull: bool) -> StoreResult<Records> {
        info!(%start, %end, pull, "getting records");
        if pull {
            self.pull()?;
        }
        let (lo, hi, descending) = if start <= end {
            (start, end, false)
        } else {
            (end, start, true)
        };

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(self.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                let name = file_name.to_string_lossy().into_owned();
                error!(%name, "record name is not valid UTF-8");
                return Err(BlobError::MalformedName {
                    name,
                    reason: "not valid UTF-8".into(),
                }
                .into());
            };
            if name.starts_with('.') {
                continue;
            }
            let ts = match self.codec.parse_name(name) {
                Ok(ts) => ts,
                Err(NameError::UnsupportedVersion { version, max, .. }) => {
                    warn!(%name, version, max, "skipping record from a newer format version");
                    continue;
                }
                Err(e) => {
                    error!(%name, error = %e, "cannot decode record name");
                    return Err(BlobError::from(e).into());
                }
            };
            if lo.contains_up_to(&hi, ts) {
                matches.push((ts, name.to_string()));
            }
        }

        matches.sort();
        if descending {
            matches.reverse();
        }
        debug!(
            count = matches.len(),
            order = if descending { "descending" } else { "ascending" },
            "yielding records"
        );
        let workdir = self.path().to_path_buf();
        let entries = matches
            .into_iter()
            .map(|(ts, name)| (ts, workdir.join(name)))
            .collect();
        Ok(Records::new(entries, self.pipeline.clone()))
    }

    /// Pull from the upstream branch. A branch without upstream is not an
    /// error; a conflicting merge is.
    pub fn pull(&mut self) -> StoreResult<()> {
        let branch = self.repo.active_branch()?;
        debug!(%branch, "pulling");
        match self.repo.pull()? {
            PullOutcome::NoUpstream => {
                warn!(%branch, "nothing pulled; the branch has no upstream");
                Ok(())
            }
            PullOutcome::Conflict { files } => {
                error!(%branch, files = ?files, "pull failed with conflicts");
                Err(RepoError::PullFailed(format!(
                    "merge into {branch} conflicts in {}",
                    files.join(", ")
                ))
                .into())
            }
            outcome => {
                info!(%branch, %outcome, "pulled");
                Ok(())
            }
        }
    }

    fn normalize(&self, time: &TimeInput) -> StoreResult<Timestamp> {
        normalize(time).map_err(|e| {
            error!(%time, error = %e, "cannot normalize time");
            StoreError::from(e)
        })
    }

    fn write_batch(&mut self, batch: &[(&[u8], Timestamp)]) -> StoreResult<()> {
        let mut written = Vec::with_capacity(batch.len());
        for (payload, ts) in batch {
            if let Err(e) = self.write_record(payload, *ts, &mut written) {
                self.discard(&written);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Unstage and delete files left by a failed batch. Errors here are
    /// logged; the original failure is what the caller sees.
    fn discard(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        warn!(count = names.len(), "removing records written by the failed batch");
        let paths: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        if let Err(e) = self.repo.unstage(&paths) {
            error!(error = %e, "cannot unstage records");
        }
        for name in names {
            match std::fs::remove_file(self.path().join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => error!(%name, error = %e, "cannot remove record"),
            }
        }
    }

    /// Write one record. Its name goes onto `written` just before the file
    /// is created.
    fn write_record(
        &mut self,
        payload: &[u8],
        ts: Timestamp,
        written: &mut Vec<String>,
    ) -> StoreResult<()> {
        let nonce = self.codec.nonce(&mut OsRng);
        let name = self.codec.make_name(ts, &nonce)?;
        let decoded = self.codec.parse_name(&name)?;
        if decoded != ts {
            error!(%name, %ts, %decoded, "record name does not decode to its timestamp");
            return Err(BlobError::VerificationFailed {
                name,
                reason: format!("name decodes to {decoded}, expected {ts}"),
            }
            .into());
        }

        let token = self.pipeline.ingress(payload)?;
        let path = self.path().join(&name);
        debug!(%name, %ts, len = token.len(), "writing record");
        written.push(name.clone());
        std::fs::write(&path, &token)?;
        self.repo.add(&[PathBuf::from(&name)])?;

        let restored = self.pipeline.egress(&std::fs::read(&path)?)?;
        if restored != payload {
            error!(%name, "record does not read back as written");
            return Err(BlobError::VerificationFailed {
                name,
                reason: "payload changed after a write and read back".into(),
            }
            .into());
        }
        info!(%name, %ts, raw = payload.len(), stored = token.len(), "added record");
        Ok(())
    }

    fn commit_and_push(&mut self, count: usize) -> StoreResult<()> {
        let branch = self.repo.active_branch()?;
        let message = match count {
            1 => "Add 1 record".to_string(),
            n => format!("Add {n} records"),
        };
        self.repo.commit(&message)?;
        info!(%branch, count, "committed");
        self.push(&branch)
    }

    /// Push, setting the upstream if there is none. A push that does not
    /// land is retried exactly once, after a pull.
    fn push(&mut self, branch: &str) -> StoreResult<()> {
        let remote = self.repo.remote_name()?.unwrap_or_default();
        debug!(%branch, %remote, "pushing");
        match self.repo.push()? {
            outcome if outcome.is_pushed() => {
                debug!(%outcome, "push landed");
            }
            PushOutcome::NoUpstream => {
                warn!(%branch, %remote, "branch has no upstream; pushing with --set-upstream");
                let outcome = self.repo.push_set_upstream()?;
                if !outcome.is_pushed() {
                    return Err(push_failed(branch, &remote, &outcome));
                }
                info!(%outcome, "upstream set");
            }
            first => {
                warn!(%branch, %remote, outcome = %first, "first push did not land; pulling before retry");
                self.pull()?;
                let second = self.repo.push()?;
                if !second.is_pushed() {
                    return Err(push_failed(branch, &remote, &second));
                }
            }
        }
        info!(%branch, %remote, "pushed");
        Ok(())
    }

    fn log_state(&self, suffix: &str) {
        info!(nonce_bits = self.codec.nonce_bits(), "random bits per record name");
        info!(path = %self.path().display(), "repository path");
        info!(
            compression = self.pipeline.compression_id().unwrap_or("disabled"),
            "compression"
        );
        info!(
            encryption = if self.pipeline.is_encrypted() { "enabled" } else { "disabled" },
            "encryption"
        );
        info!(
            version = FORMAT_VERSION,
            suffix,
            encoding = %self.codec.encoding(),
            "record format for new files"
        );
    }
}

fn check_repo<R: VersionedRepo>(repo: &R) -> StoreResult<()> {
    let path = repo.workdir().to_path_buf();
    debug!(path = %path.display(), "checking repository");
    if repo.is_bare()? {
        error!(path = %path.display(), "repository is bare");
        return Err(RepoError::Bare(path).into());
    }
    info!(branch = %repo.active_branch()?, "active branch");
    if repo.is_dirty()? {
        error!(path = %path.display(), "repository is dirty");
        return Err(RepoError::Dirty(path).into());
    }
    let untracked = repo.untracked_files()?;
    if !untracked.is_empty() {
        error!(files = ?untracked, "repository has untracked files");
        return Err(RepoError::HasUntrackedFiles(untracked).into());
    }
    let remote = match repo.remote_name()? {
        Some(remote) if repo.has_remote()? => remote,
        _ => {
            error!("repository has no remote");
            return Err(RepoError::NoRemote.into());
        }
    };
    if !repo.remote_reachable()? {
        error!(%remote, "remote is unreachable");
        return Err(RepoError::RemoteUnreachable {
            remote,
            reason: "the remote did not answer".into(),
        }
        .into());
    }
    info!(%remote, "repository remote");
    debug!("finished checking repository");
    Ok(())
}

fn push_failed(branch: &str, remote: &str, outcome: &PushOutcome) -> StoreError {
    error!(%branch, %remote, %outcome, "push failed");
    RepoError::PushFailed(format!("pushing {branch} to {remote}: {outcome}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobts_codec::BigUint;
    use blobts_pipeline::{generate_key, PipelineError};
    use blobts_repo::{CallCounts, ScriptedRepo};
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn open(dir: &TempDir, options: StoreOptions) -> Store<ScriptedRepo> {
        Store::open(ScriptedRepo::new(dir.path()), options).unwrap()
    }

    fn collect(records: Records) -> Vec<(i128, Vec<u8>)> {
        records
            .map(|r| r.map(|r| (r.time_utc_ns.as_nanos(), r.data)))
            .collect::<StoreResult<_>>()
            .unwrap()
    }

    fn file_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    fn secs(s: i128) -> i128 {
        s * 1_000_000_000
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn dated_records_come_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        let times = store
            .add_many(
                [b"b".as_slice(), b"c", b"a"],
                ["2020-03-03", "2121-12-21", "2010-01-01"],
            )
            .unwrap();
        assert_eq!(
            times.iter().map(Timestamp::as_nanos).collect::<Vec<_>>(),
            vec![secs(1_583_193_600), secs(4_795_718_400), secs(1_262_304_000)]
        );

        let all = collect(store.get(None, None, false).unwrap());
        let data: Vec<_> = all.iter().map(|(_, d)| d.clone()).collect();
        assert_eq!(data, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

        let from = TimeInput::utc(midnight(1900, 1, 1));
        let to = TimeInput::utc(midnight(2200, 1, 1));
        let bounded = collect(store.get(Some(from), Some(to), false).unwrap());
        assert_eq!(bounded, all);

        let newest_first = collect(
            store
                .get(Some(TimeInput::Seconds(f64::INFINITY)), Some(TimeInput::Seconds(f64::NEG_INFINITY)), false)
                .unwrap(),
        );
        assert_eq!(newest_first.len(), 3);
        assert_eq!(newest_first[0].1, b"c");
        assert_eq!(newest_first[2].1, b"a");

        let calls = store.repo().calls();
        assert_eq!(calls.commit, 1);
        assert_eq!(calls.push, 1);
        assert_eq!(calls.add, 3);
    }

    #[test]
    fn epoch_zero_is_a_real_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        assert_eq!(store.add(b"zero", 0.0).unwrap(), Timestamp::ZERO);
        let now = store.add(b"now", TimeInput::Now).unwrap();
        assert!(now > Timestamp::ZERO);

        let zero = collect(
            store
                .get(Some(TimeInput::Seconds(0.0)), Some(TimeInput::Seconds(0.0)), false)
                .unwrap(),
        );
        assert_eq!(zero, vec![(0, b"zero".to_vec())]);

        let neg_inf = Some(TimeInput::Seconds(f64::NEG_INFINITY));
        assert_eq!(store.get(neg_inf.clone(), neg_inf, false).unwrap().count(), 0);
        assert_eq!(store.get(None, None, false).unwrap().len(), 2);
    }

    #[test]
    fn identical_payloads_at_one_instant_stay_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::default()
            .with_compression("zstd")
            .with_key(generate_key());
        let mut store = open(&dir, options);
        let payload = vec![0x2Au8; 111];
        let at = TimeInput::Seconds(1_583_193_600.25);
        let times = store
            .add_many([payload.clone(), payload.clone()], [at.clone(), at])
            .unwrap();
        assert_eq!(times[0], times[1]);

        assert_eq!(file_count(&dir), 2);
        let mut stored: Vec<Vec<u8>> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| std::fs::read(e.unwrap().path()).unwrap())
            .collect();
        assert_ne!(stored.pop(), stored.pop());

        let records = collect(store.get(None, None, false).unwrap());
        assert_eq!(records.len(), 2);
        for (ts, data) in records {
            assert_eq!(ts, times[0].as_nanos());
            assert_eq!(data, payload);
        }
    }

    #[test]
    fn reversed_bounds_reverse_order_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        store
            .add_many([b"1".as_slice(), b"2", b"3", b"4"], [10.0, 20.0, 20.0, 30.0])
            .unwrap();
        let (a, b) = (TimeInput::Seconds(15.0), TimeInput::Seconds(30.0));
        let forward = collect(store.get(Some(a.clone()), Some(b.clone()), false).unwrap());
        let mut backward = collect(store.get(Some(b), Some(a), false).unwrap());
        assert_eq!(forward.len(), 3);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn diverged_push_pulls_once_and_retries_once() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path())
            .script_push([PushOutcome::Rejected { reason: "fetch first".into() }])
            .script_pull([PullOutcome::Merged]);
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        store.add(b"x", TimeInput::Now).unwrap();
        let calls = store.repo().calls();
        assert_eq!((calls.pull, calls.push), (1, 2));
    }

    #[test]
    fn second_failed_push_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path())
            .push_fallback(PushOutcome::Rejected { reason: "fetch first".into() });
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        let err = store.add(b"x", TimeInput::Now).unwrap_err();
        assert!(matches!(err, StoreError::Repo(RepoError::PushFailed(_))));
        let calls = store.repo().calls();
        assert_eq!((calls.pull, calls.push), (1, 2));
    }

    #[test]
    fn up_to_date_push_counts_as_not_pushed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path()).script_push([PushOutcome::UpToDate]);
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        store.add(b"x", TimeInput::Now).unwrap();
        assert_eq!(store.repo().calls().push, 2);
        assert_eq!(store.repo().calls().pull, 1);
    }

    #[test]
    fn missing_upstream_is_set_on_push() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path()).script_push([PushOutcome::NoUpstream]);
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        store.add(b"x", TimeInput::Now).unwrap();
        let calls = store.repo().calls();
        assert_eq!(calls.push_set_upstream, 1);
        assert_eq!(calls.pull, 0);

        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path())
            .script_push([PushOutcome::NoUpstream])
            .set_upstream_outcome(PushOutcome::Error { message: "denied".into() });
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        assert!(matches!(
            store.add(b"x", TimeInput::Now),
            Err(StoreError::Repo(RepoError::PushFailed(_)))
        ));
    }

    #[test]
    fn pull_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path()).script_pull([
            PullOutcome::NoUpstream,
            PullOutcome::FastForward,
            PullOutcome::Conflict { files: vec!["x".into()] },
        ]);
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        assert!(store.get(None, None, true).is_ok());
        assert!(store.get(None, None, true).is_ok());
        assert!(matches!(
            store.get(None, None, true),
            Err(StoreError::Repo(RepoError::PullFailed(_)))
        ));
        assert_eq!(store.repo().calls().pull, 3);
        assert!(store.get(None, None, false).is_ok());
        assert_eq!(store.repo().calls().pull, 3);
    }

    #[test]
    fn health_checks() {
        let dir = tempfile::tempdir().unwrap();
        let cases: Vec<(ScriptedRepo, fn(&StoreError) -> bool)> = vec![
            (ScriptedRepo::new(dir.path()).bare(), |e| {
                matches!(e, StoreError::Repo(RepoError::Bare(_)))
            }),
            (ScriptedRepo::new(dir.path()).dirty(), |e| {
                matches!(e, StoreError::Repo(RepoError::Dirty(_)))
            }),
            (ScriptedRepo::new(dir.path()).with_untracked(&["stray.txt"]), |e| {
                matches!(e, StoreError::Repo(RepoError::HasUntrackedFiles(f)) if f == &["stray.txt"])
            }),
            (ScriptedRepo::new(dir.path()).without_remote(), |e| {
                matches!(e, StoreError::Repo(RepoError::NoRemote))
            }),
            (ScriptedRepo::new(dir.path()).unreachable(), |e| {
                matches!(e, StoreError::Repo(RepoError::RemoteUnreachable { .. }))
            }),
        ];
        for (repo, expected) in cases {
            let err = Store::open(repo, StoreOptions::default()).unwrap_err();
            assert!(expected(&err), "{err:?}");
        }
    }

    #[test]
    fn invalid_time_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        let err = store
            .add_many([b"a".as_slice(), b"b"], [TimeInput::Seconds(1.0), TimeInput::Seconds(f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Time(_)));
        assert_eq!(file_count(&dir), 0);
        assert_eq!(store.repo().calls(), CallCounts::default());
    }

    #[test]
    fn failed_batch_leaves_clean_working_copy() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ScriptedRepo::new(dir.path()).fail_add_at(3);
        let mut store = Store::open(repo, StoreOptions::default()).unwrap();
        let err = store
            .add_many([b"a".as_slice(), b"b", b"c", b"d"], [1.0, 2.0, 3.0, 4.0])
            .unwrap_err();
        assert!(matches!(err, StoreError::Repo(RepoError::Command { .. })));
        assert_eq!(file_count(&dir), 0);
        assert!(store.repo().staged().is_empty());
        let calls = store.repo().calls();
        assert_eq!(calls.add, 3);
        assert_eq!(calls.unstage, 1);
        assert_eq!(calls.commit, 0);
        assert_eq!(calls.push, 0);

        let times = store.add_many([b"e".as_slice()], [5.0]).unwrap();
        assert_eq!(times, vec![Timestamp::from_secs_nanos(5, 0)]);
        assert_eq!(file_count(&dir), 1);
    }

    #[test]
    fn empty_batch_does_not_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        let times = store.add_many_now(Vec::<Vec<u8>>::new()).unwrap();
        assert!(times.is_empty());
        assert_eq!(store.repo().calls().commit, 0);
        assert_eq!(store.repo().calls().push, 0);
    }

    #[test]
    fn shorter_input_governs() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        let times = store
            .add_many([b"a".as_slice(), b"b", b"c"], [1.0, 2.0])
            .unwrap();
        assert_eq!(times.len(), 2);
        assert_eq!(file_count(&dir), 2);
    }

    #[test]
    fn newer_format_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        store.add(b"mine", 5.0).unwrap();
        let future = store
            .codec()
            .make_name_with_version(Timestamp::from_nanos(7), &BigUint::from(1u8), FORMAT_VERSION + 1)
            .unwrap();
        std::fs::write(dir.path().join(future), b"from the future").unwrap();
        std::fs::write(dir.path().join(".gitattributes"), b"* binary").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();

        let records = collect(store.get(None, None, false).unwrap());
        assert_eq!(records, vec![(secs(5), b"mine".to_vec())]);
    }

    #[test]
    fn malformed_name_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        std::fs::write(dir.path().join("README"), b"hello").unwrap();
        let err = store.get(None, None, false).unwrap_err();
        assert!(matches!(err, StoreError::Blob(BlobError::MalformedName { .. })));
    }

    #[test]
    fn wrong_key_fails_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = open(&dir, StoreOptions::default().with_key(generate_key()));
        writer.add(b"secret", 1.0).unwrap();

        let mut reader = open(&dir, StoreOptions::default().with_key(generate_key()));
        let mut records = reader.get(None, None, false).unwrap();
        assert!(matches!(
            records.next(),
            Some(Err(StoreError::Pipeline(PipelineError::Authentication)))
        ));
        assert!(records.next().is_none());
    }

    #[test]
    fn records_are_read_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(&dir, StoreOptions::default());
        store.add_many([b"a".as_slice(), b"b"], [1.0, 2.0]).unwrap();
        let mut records = store.get(None, None, false).unwrap();
        assert_eq!(records.len(), 2);
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            std::fs::remove_file(entry.unwrap().path()).unwrap();
        }
        assert!(matches!(records.next(), Some(Err(StoreError::Io(_)))));
    }

    #[test]
    fn every_encoding_works_end_to_end() {
        for encoding in blobts_codec::Encoding::ALL {
            let dir = tempfile::tempdir().unwrap();
            let mut store = open(&dir, StoreOptions::default().with_encoding(encoding).with_nonce_bits(64));
            store.add_many([b"old".as_slice(), b"new"], [-1.5, 1.5]).unwrap();
            let records = collect(store.get(None, None, false).unwrap());
            assert_eq!(records[0], (-1_500_000_000, b"old".to_vec()), "{encoding}");
            assert_eq!(records[1], (1_500_000_000, b"new".to_vec()), "{encoding}");
        }
    }

    #[test]
    fn zero_nonce_bits_rejected_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = Store::open(
            ScriptedRepo::new(dir.path()),
            StoreOptions::default().with_nonce_bits(0),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
