//! File-backed [`BulkSink`] with one JSON-lines file per collection.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use cliquegen_core::{Batch, BulkSink, Role, SinkError};
use serde::Serialize;
use tracing::debug;

use crate::{
    errors::JsonLinesError,
    naming::DocumentNaming,
    records::{EdgeRecord, VertexRecord},
};

/// One output file and the length of its committed prefix.
#[derive(Debug)]
struct CollectionFile {
    path: PathBuf,
    state: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    file: File,
    committed: u64,
}

impl CollectionFile {
    fn create(path: PathBuf) -> Result<Self, JsonLinesError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| JsonLinesError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            state: Mutex::new(FileState { file, committed: 0 }),
        })
    }

    /// Appends `bytes` as a unit; on failure the file is cut back to the
    /// previously committed length.
    fn append(&self, role: Role, bytes: &[u8]) -> Result<(), SinkError> {
        let mut state = self.state.lock().map_err(|_| SinkError::Poisoned {
            resource: match role {
                Role::Vertex => "vertex collection file",
                Role::Edge => "edge collection file",
            },
        })?;
        let FileState { file, committed } = &mut *state;
        match file.write_all(bytes).and_then(|()| file.flush()) {
            Ok(()) => {
                *committed += bytes.len() as u64;
                Ok(())
            }
            Err(err) => {
                let rollback = file
                    .set_len(*committed)
                    .and_then(|()| file.seek(SeekFrom::Start(*committed)).map(|_| ()));
                if let Err(rollback_err) = rollback {
                    tracing::error!(
                        path = %self.path.display(),
                        error = %rollback_err,
                        "failed to roll back partial batch"
                    );
                }
                Err(io_error(role, &err))
            }
        }
    }
}

fn io_error(role: Role, err: &io::Error) -> SinkError {
    SinkError::Io {
        role,
        message: Arc::from(err.to_string()),
    }
}

/// Writes vertex and edge batches to `<collection>.jsonl` files.
///
/// Every batch is serialised in memory first and then appended with a single
/// write under the collection's lock, so concurrent workers never interleave
/// lines and a failed commit leaves no partial batch behind.
///
/// # Examples
/// ```
/// use cliquegen_core::{Batch, BulkSink, VertexDocument};
/// use cliquegen_sinks_jsonl::{DocumentNaming, JsonLinesSink};
///
/// let dir = tempfile::tempdir()?;
/// let sink = JsonLinesSink::create(dir.path(), DocumentNaming::default())?;
/// sink.commit(Batch::Vertices(&[VertexDocument { id: 3, part: None, property: None }]))?;
/// let written = std::fs::read_to_string(sink.vertex_path())?;
/// assert_eq!(written, "{\"_key\":\"3\"}\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct JsonLinesSink {
    name: String,
    naming: DocumentNaming,
    vertices: CollectionFile,
    edges: CollectionFile,
}

impl JsonLinesSink {
    /// Validates `naming`, creates `dir` if needed and truncates both
    /// collection files.
    ///
    /// # Errors
    /// Returns [`JsonLinesError::Naming`] for invalid names and
    /// [`JsonLinesError::Io`] when the directory or a file cannot be created.
    pub fn create(
        dir: impl AsRef<Path>,
        naming: DocumentNaming,
    ) -> Result<Self, JsonLinesError> {
        naming.validate()?;
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| JsonLinesError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let vertices = CollectionFile::create(dir.join(naming.vertex_file()))?;
        let edges = CollectionFile::create(dir.join(naming.edge_file()))?;
        Ok(Self {
            name: format!("jsonl:{}", dir.display()),
            naming,
            vertices,
            edges,
        })
    }

    /// Path of the vertex collection file.
    #[must_use]
    pub fn vertex_path(&self) -> &Path {
        &self.vertices.path
    }

    /// Path of the edge collection file.
    #[must_use]
    pub fn edge_path(&self) -> &Path {
        &self.edges.path
    }

    /// Naming used for rendered documents.
    #[must_use]
    pub fn naming(&self) -> &DocumentNaming {
        &self.naming
    }
}

fn encode<T: Serialize>(
    role: Role,
    records: impl Iterator<Item = T>,
) -> Result<Vec<u8>, SinkError> {
    let mut buffer = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buffer, &record).map_err(|err| {
            SinkError::Serialization {
                role,
                message: Arc::from(err.to_string()),
            }
        })?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

impl BulkSink for JsonLinesSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn commit(&self, batch: Batch<'_>) -> Result<(), SinkError> {
        let role = batch.role();
        let (bytes, target) = match batch {
            Batch::Vertices(documents) => (
                encode(
                    role,
                    documents.iter().map(|document| VertexRecord {
                        naming: &self.naming,
                        document,
                    }),
                )?,
                &self.vertices,
            ),
            Batch::Edges(documents) => (
                encode(
                    role,
                    documents.iter().map(|document| EdgeRecord {
                        naming: &self.naming,
                        document,
                    }),
                )?,
                &self.edges,
            ),
        };
        target.append(role, &bytes)?;
        debug!(
            role = role.as_str(),
            documents = batch.len(),
            bytes = bytes.len(),
            "batch written"
        );
        Ok(())
    }
}
