use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// A photo being written to disk. The payload goes into a `{name}.part`
/// file next to its final location; `persist` renames it into place. If the
/// guard is dropped before `persist`, the part file is removed, so a failed
/// item leaves nothing behind.
pub struct StagedPhoto {
    file: Option<tokio::fs::File>,
    part_path: PathBuf,
    final_path: PathBuf,
    persisted: bool,
}

impl StagedPhoto {
    pub async fn create(dir: &Path, filename: &str) -> io::Result<Self> {
        let final_path = dir.join(filename);
        let part_path = dir.join(format!("{}.part", filename));
        let file = tokio::fs::File::create(&part_path).await?;

        Ok(Self {
            file: Some(file),
            part_path,
            final_path,
            persisted: false,
        })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await,
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "staged photo already persisted",
            )),
        }
    }

    /// Flush the part file and move it to its final name. Consumes the
    /// guard; this is the single save this handle exists for.
    pub async fn persist(mut self) -> io::Result<PathBuf> {
        if let Some(file) = self.file.take() {
            file.sync_all().await?;
        }
        tokio::fs::rename(&self.part_path, &self.final_path).await?;
        self.persisted = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for StagedPhoto {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.part_path);
        }
    }
}
