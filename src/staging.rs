use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ACTION_LABEL: &str = "Select files to analyze";
pub const BUSY_ACTION_LABEL: &str = "Analyzing…";

/// Extensions the verification backend accepts, with the MIME type sent for each.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("json", "application/json"),
];

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub path: PathBuf,
}

impl StagedFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            path: path.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("stat evidence file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            mime_type: guess_mime(&name).to_string(),
            name,
            size: meta.len(),
            path: path.to_path_buf(),
        })
    }

    /// Two staged files are the same evidence when name and size both match.
    pub fn key(&self) -> (&str, u64) {
        (self.name.as_str(), self.size)
    }
}

pub fn guess_mime(name: &str) -> &'static str {
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return FALLBACK_MIME,
    };
    KNOWN_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}

pub fn is_known_extension(name: &str) -> bool {
    guess_mime(name) != FALLBACK_MIME
}

/// Enabled state and label of the analyze control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub enabled: bool,
    pub label: String,
}

impl ActionState {
    pub fn busy() -> Self {
        Self {
            enabled: false,
            label: BUSY_ACTION_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileStaging {
    files: Vec<StagedFile>,
}

impl FileStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every candidate whose (name, size) is not staged yet. Returns how many were added.
    pub fn add_files<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = StagedFile>,
    {
        let mut added = 0;
        for candidate in candidates {
            if self.files.iter().any(|f| f.key() == candidate.key()) {
                continue;
            }
            self.files.push(candidate);
            added += 1;
        }
        added
    }

    pub fn remove_file(&mut self, index: usize) -> Option<StagedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn action_state(&self) -> ActionState {
        match self.files.len() {
            0 => ActionState {
                enabled: false,
                label: DEFAULT_ACTION_LABEL.to_string(),
            },
            1 => ActionState {
                enabled: true,
                label: "Analyze 1 file".to_string(),
            },
            n => ActionState {
                enabled: true,
                label: format!("Analyze {n} files"),
            },
        }
    }
}
