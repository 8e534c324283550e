use crate::error::StoreError;
use bytes::Bytes;
use futures::Stream;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// One workflow run payload per file.
    Run,
    /// The full job list (with nested steps) of one run.
    Jobs,
}

impl EntityKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            EntityKind::Run => "runs",
            EntityKind::Jobs => "jobs",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityStore {
    root: PathBuf,
}

impl EntityStore {
    /// Opens a store rooted at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let metadata = std::fs::metadata(&root).map_err(|err| StoreError::io(&root, err))?;
        if !metadata.is_dir() {
            return Err(StoreError::NotADirectory { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, workflow_id: u64, kind: EntityKind) -> PathBuf {
        self.root
            .join("workflows")
            .join(workflow_id.to_string())
            .join(kind.dir_name())
    }

    pub fn path(&self, workflow_id: u64, kind: EntityKind, id: u64) -> PathBuf {
        self.dir(workflow_id, kind)
            .join(format!("{id}.{FILE_EXTENSION}"))
    }

    /// Whether the entity is stored. I/O errors other than "not found" are
    /// reported rather than read as absence.
    pub async fn exists(
        &self,
        workflow_id: u64,
        kind: EntityKind,
        id: u64,
    ) -> Result<bool, StoreError> {
        let path = self.path(workflow_id, kind, id);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|err| StoreError::io(path, err))
    }

    /// Persists `bytes` unless the entity already exists.
    ///
    /// The payload is staged in a temporary file next to its destination and
    /// linked into place without clobbering, so readers never observe a
    /// partial file and a concurrent writer of the same id gets
    /// [`StoreError::AlreadyExists`].
    pub async fn write(
        &self,
        workflow_id: u64,
        kind: EntityKind,
        id: u64,
        bytes: impl Into<Bytes>,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.dir(workflow_id, kind);
        let path = self.path(workflow_id, kind, id);
        let bytes = bytes.into();
        tokio::task::spawn_blocking(move || write_new(&dir, path, &bytes))
            .await
            .map_err(|err| StoreError::Task(err.to_string()))?
    }

    pub async fn read(
        &self,
        workflow_id: u64,
        kind: EntityKind,
        id: u64,
    ) -> Result<Vec<u8>, StoreError> {
        let path = self.path(workflow_id, kind, id);
        tokio::fs::read(&path)
            .await
            .map_err(|err| StoreError::io(path, err))
    }

    /// Lazily enumerates the ids stored for `kind`, in directory order.
    ///
    /// A missing directory yields nothing. Entries that are not `<id>.json`
    /// files are skipped.
    pub fn list(
        &self,
        workflow_id: u64,
        kind: EntityKind,
    ) -> impl Stream<Item = Result<u64, StoreError>> + Send + 'static {
        let dir = self.dir(workflow_id, kind);
        async_stream::stream! {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
                Err(err) => {
                    yield Err(StoreError::io(&dir, err));
                    return;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(StoreError::io(&dir, err));
                        break;
                    }
                };
                match entry.file_type().await {
                    Ok(file_type) if file_type.is_file() => {}
                    Ok(_) => continue,
                    Err(err) => {
                        yield Err(StoreError::io(entry.path(), err));
                        continue;
                    }
                }
                let path = entry.path();
                match parse_id(&path) {
                    Some(id) => yield Ok(id),
                    None => tracing::debug!(path = %path.display(), "skipping unrecognized file"),
                }
            }
        }
    }

    /// Ids of stored runs for which no job list has been captured yet.
    pub async fn run_ids_without_jobs(&self, workflow_id: u64) -> Result<Vec<u64>, StoreError> {
        use futures::StreamExt;

        let mut missing = Vec::new();
        let runs = self.list(workflow_id, EntityKind::Run);
        futures::pin_mut!(runs);
        while let Some(run_id) = runs.next().await {
            let run_id = run_id?;
            if !self.exists(workflow_id, EntityKind::Jobs, run_id).await? {
                missing.push(run_id);
            }
        }
        Ok(missing)
    }
}

fn write_new(dir: &Path, path: PathBuf, bytes: &[u8]) -> Result<PathBuf, StoreError> {
    if path.exists() {
        return Err(StoreError::AlreadyExists { path });
    }
    std::fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| StoreError::io(tmp.path(), err))?;
    tmp.persist_noclobber(&path)
        .map_err(|err| StoreError::io(&path, err.error))?;
    Ok(path)
}

fn parse_id(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != FILE_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let id: u64 = stem.parse().ok()?;
    // `+5` and `007` parse, but `path()` would point at `5.json` / `7.json`.
    (id.to_string() == stem).then_some(id)
}
