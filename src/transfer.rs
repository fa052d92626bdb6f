//! Plain-text import and export of entries

use crate::error::{Error, Result};
use crate::store::{Entry, Index, Storage};
use regex::Regex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Create a new entry from a text file, named after the file
pub fn import_file(storage: &Storage, path: &Path, size_limit: u64) -> Result<(Entry, Index)> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    if metadata.len() > size_limit {
        return Err(Error::FileTooLarge {
            size: metadata.len(),
            limit: size_limit,
        });
    }

    // The file may have grown since the metadata check
    let mut data = Vec::new();
    File::open(path)?
        .take(size_limit.saturating_add(1))
        .read_to_end(&mut data)?;
    if data.len() as u64 > size_limit {
        return Err(Error::FileTooLarge {
            size: data.len() as u64,
            limit: size_limit,
        });
    }

    let text = String::from_utf8(data).map_err(|_| {
        Error::Serialization(format!("{} is not valid UTF-8", path.display()))
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (entry, index) = storage.create(&name, &text)?;
    info!("Imported {} bytes as entry {}", text.len(), entry.id);
    Ok((entry, index))
}

/// Write an entry's text to a new file; never overwrites
pub fn export_entry(storage: &Storage, id: Uuid, path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::AlreadyExists(path.to_path_buf()));
    }

    let entry = storage.read(id)?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            Error::AlreadyExists(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    file.write_all(entry.text.as_bytes())?;
    file.sync_all()?;

    info!("Exported entry {} ({} bytes)", id, entry.text.len());
    Ok(())
}

/// Suggested export file name for an entry name
///
/// Only ASCII letters, digits and `_` survive; every other run of characters
/// becomes a single `_`.
pub fn export_file_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let slug = match Regex::new(r"[^A-Za-z0-9_]+") {
        Ok(re) => re.replace_all(&lowered, "_").into_owned(),
        Err(_) => lowered,
    };
    format!("{}.txt", slug.trim_matches('_'))
}
