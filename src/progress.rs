use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::json;

/// Progress file polled by front ends. Without a path every update is dropped.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    path: Option<PathBuf>,
}

impl Progress {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Progress {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Progress::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn update(&self, current: usize, total: usize, phase: &str, status: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let json = json!({
            "current": current,
            "total": total,
            "phase": phase,
            "status": status,
        });
        if let Err(e) = fs::write(path, json.to_string()) {
            log::debug!("Could not write progress to {}: {}", path.display(), e);
        }
    }
}
