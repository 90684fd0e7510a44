// Archive handling for downloaded artifacts. Only the two formats release pages actually
// use are supported: zip and gzip-compressed tar. Anything else is treated as a bare file.

use crate::log_debug;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tar::Archive;
use zip::ZipArchive;

/// How a downloaded artifact is laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    /// A single executable, stored under the given file name.
    Binary(String),
}

impl ArchiveFormat {
    /// Picks the archive format from an extension token (`zip`, `tar.gz`, `tgz`).
    /// Returns `None` for anything that is not an archive.
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "zip" => Some(Self::Zip),
            "tar.gz" | "tgz" => Some(Self::TarGz),
            _ => None,
        }
    }
}

/// Unpacks `src` into `dest` (which must exist) according to `format`.
///
/// Archive contents land directly in `dest`, preserving their internal layout and unix
/// permission bits. A [`ArchiveFormat::Binary`] is copied to `dest/<name>`.
pub fn unpack(src: &Path, dest: &Path, format: &ArchiveFormat) -> io::Result<()> {
    log_debug!("[Compression] Unpacking {} ({:?}) into {}", src.display(), format, dest.display());

    match format {
        ArchiveFormat::Zip => {
            let file = File::open(src)?;
            let mut archive = ZipArchive::new(file).map_err(zip_to_io)?;
            archive.extract(dest).map_err(zip_to_io)?;
        }
        ArchiveFormat::TarGz => {
            let file = File::open(src)?;
            let mut archive = Archive::new(GzDecoder::new(file));
            archive.set_preserve_permissions(true);
            archive.unpack(dest)?;
        }
        ArchiveFormat::Binary(name) => {
            fs::copy(src, dest.join(name))?;
        }
    }

    Ok(())
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, body) in entries {
            zip.start_file(*name, zip::write::FileOptions::default()).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, body) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *body).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn picks_format_from_ext() {
        assert_eq!(ArchiveFormat::from_ext("zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_ext(".tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_ext("tgz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_ext("exe"), None);
    }

    #[test]
    fn unpacks_zip_keeping_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("protoc.zip");
        write_zip(&archive, &[("bin/protoc", b"#!/bin/sh\n"), ("include/a.proto", b"x")]);
        let dest = tmp.path().join("out");
        fs::create_dir(&dest).unwrap();

        unpack(&archive, &dest, &ArchiveFormat::Zip).unwrap();

        assert!(dest.join("bin/protoc").is_file());
        assert!(dest.join("include/a.proto").is_file());
    }

    #[test]
    fn unpacks_tar_gz_keeping_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("plugin.tar.gz");
        write_tar_gz(&archive, &[("protoc-gen-go", b"bin")]);
        let dest = tmp.path().join("out");
        fs::create_dir(&dest).unwrap();

        unpack(&archive, &dest, &ArchiveFormat::TarGz).unwrap();

        assert_eq!(fs::read(dest.join("protoc-gen-go")).unwrap(), b"bin");
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("broken.zip");
        fs::write(&archive, b"not a zip").unwrap();

        assert!(unpack(&archive, tmp.path(), &ArchiveFormat::Zip).is_err());
    }

    #[test]
    fn binary_is_copied_under_its_name() {
        let tmp = tempfile::tempdir().unwrap();
        let download = tmp.path().join("download");
        fs::write(&download, b"elf").unwrap();
        let dest = tmp.path().join("out");
        fs::create_dir(&dest).unwrap();

        unpack(&download, &dest, &ArchiveFormat::Binary("protoc-gen-grpc-java".into())).unwrap();

        assert_eq!(fs::read(dest.join("protoc-gen-grpc-java")).unwrap(), b"elf");
    }
}
