use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::provenance::Snapshot;

/// The named artifacts the pipeline persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Chart,
    Lyrics,
    RawFeatures,
    ParsedFeatures,
}

impl Artifact {
    pub const ALL: [Self; 4] = [
        Self::Chart,
        Self::Lyrics,
        Self::RawFeatures,
        Self::ParsedFeatures,
    ];

    /// File stem shared by the JSON snapshot and its CSV export.
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Lyrics => "lyrics",
            Self::RawFeatures => "raw_features",
            Self::ParsedFeatures => "parsed_features",
        }
    }

    /// The CLI stage that writes this artifact.
    pub const fn produced_by(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::Lyrics => "lyrics",
            Self::RawFeatures | Self::ParsedFeatures => "features",
        }
    }
}

/// A directory of JSON snapshots with stable file names.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open (or create) a snapshot directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(format!("{}.json", artifact.file_stem()))
    }

    pub fn csv_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    pub fn exists(&self, artifact: Artifact) -> bool {
        self.path(artifact).exists()
    }

    /// Write `data` as the snapshot for `artifact`, replacing any previous
    /// one. The file is written beside the target and renamed into place.
    pub fn save<T: Serialize>(&self, artifact: Artifact, data: &T) -> Result<PathBuf> {
        let path = self.path(artifact);
        let tmp = path.with_extension("json.tmp");

        let snapshot = Snapshot::new(data);
        let json = serde_json::to_vec_pretty(&snapshot)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        log::info!(
            "Wrote {} snapshot to {}",
            artifact.file_stem(),
            path.display()
        );
        Ok(path)
    }

    /// Read the snapshot for `artifact`.
    pub fn load<T: DeserializeOwned>(&self, artifact: Artifact) -> Result<Snapshot<T>> {
        let path = self.path(artifact);
        if !path.exists() {
            return Err(Error::SnapshotMissing {
                artifact: artifact.file_stem(),
                stage: artifact.produced_by(),
                path,
            });
        }

        let bytes = fs::read(&path)?;
        let snapshot = serde_json::from_slice(&bytes)?;
        log::debug!(
            "Loaded {} snapshot from {}",
            artifact.file_stem(),
            path.display()
        );
        Ok(snapshot)
    }
}
