//! Local file handling
//!
//! Opens the local side of `get`/`put` positioned at the resume offset.

use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::path::Path;

/// Opens `path` as the destination of a download.
///
/// With `autoseek` and a non-zero `resume_pos` the existing file is kept,
/// cut to `resume_pos` and positioned there; otherwise it is truncated.
pub fn open_download_target(path: &Path, resume_pos: u64, autoseek: bool) -> io::Result<File> {
    if autoseek && resume_pos > 0 {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(resume_pos)?;
        file.seek(SeekFrom::Start(resume_pos))?;
        debug!("Resuming download into {} at {}", path.display(), resume_pos);
        Ok(file)
    } else {
        File::create(path)
    }
}

/// Opens `path` as the source of an upload, skipping `start_pos` bytes when
/// `autoseek` is set.
pub fn open_upload_source(path: &Path, start_pos: u64, autoseek: bool) -> io::Result<File> {
    let mut file = File::open(path)?;
    if autoseek && start_pos > 0 {
        file.seek(SeekFrom::Start(start_pos))?;
        debug!("Resuming upload from {} at {}", path.display(), start_pos);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_download_target_truncates_without_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"stale content").unwrap();

        let mut file = open_download_target(&path, 0, true).unwrap();
        file.write_all(b"new").unwrap();
        drop(file);

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_download_target_resumes_at_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut file = open_download_target(&path, 4, true).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        assert_eq!(std::fs::read(&path).unwrap(), b"0123abc");
    }

    #[test]
    fn test_upload_source_skips_start_pos() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut rest = String::new();
        open_upload_source(&path, 6, true)
            .unwrap()
            .read_to_string(&mut rest)
            .unwrap();
        assert_eq!(rest, "6789");

        let mut all = String::new();
        open_upload_source(&path, 6, false)
            .unwrap()
            .read_to_string(&mut all)
            .unwrap();
        assert_eq!(all, "0123456789");
    }
}
