use crate::journal::Journal;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV export target for the session journal.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn from_path(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                let _ = fs::create_dir_all(parent);
            }
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export(&self, journal: &Journal) -> Result<()> {
        let data = journal.to_csv();
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &self.path)?;
        log::info!(
            "Exported {} journal entries to {}",
            journal.entries().len(),
            self.path.display()
        );
        Ok(())
    }
}
