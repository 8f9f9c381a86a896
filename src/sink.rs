//! Where finished reports go.
//!
//! The generator never touches the file system itself; it hands every
//! [`ReportArtifact`] to a [`ReportSink`]. [`DirectorySink`] is the one the
//! CLI uses. A closure `Fn(&ReportArtifact) -> io::Result<()>` is a sink too.

use crate::output::ReportArtifact;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives each report as soon as it is serialized.
///
/// Called from the generating task, one report at a time per call; an
/// error fails that report only.
pub trait ReportSink: Send + Sync {
    fn write(&self, artifact: &ReportArtifact) -> std::io::Result<()>;
}

impl<F> ReportSink for F
where
    F: Fn(&ReportArtifact) -> std::io::Result<()> + Send + Sync,
{
    fn write(&self, artifact: &ReportArtifact) -> std::io::Result<()> {
        self(artifact)
    }
}

/// Writes `<dir>/<file_name>` atomically: temp file in the same directory,
/// then rename over the target.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of a report in this directory.
    pub fn path_for(&self, artifact: &ReportArtifact) -> PathBuf {
        self.dir.join(&artifact.file_name)
    }
}

impl ReportSink for DirectorySink {
    fn write(&self, artifact: &ReportArtifact) -> std::io::Result<()> {
        let target = self.path_for(artifact);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&artifact.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| e.error)?;
        debug!("Wrote {} ({} bytes)", target.display(), artifact.bytes.len());
        Ok(())
    }
}
