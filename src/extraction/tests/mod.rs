use crate::error::Error;
use crate::extraction::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

enum Entry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
}

/// Create a ZIP archive with the given entries, in order
fn create_zip_archive(archive_path: &Path, entries: &[Entry<'_>]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for entry in entries {
        match entry {
            Entry::Dir(name) => writer.add_directory(*name, options).unwrap(),
            Entry::File(name, content) => {
                writer.start_file(*name, options).unwrap();
                std::io::Write::write_all(&mut writer, content).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

/// Zip up every file and directory below `source` with deflate compression
fn zip_directory(source: &Path, archive_path: &Path) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options = ::zip::write::FileOptions::default()
        .compression_method(::zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.unwrap();
        let name = entry
            .path()
            .strip_prefix(source)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        if entry.file_type().is_dir() {
            writer.add_directory(name, options).unwrap();
        } else {
            writer.start_file(name, options).unwrap();
            let content = std::fs::read(entry.path()).unwrap();
            std::io::Write::write_all(&mut writer, &content).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Relative path -> file content (None for directories)
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            let content = if e.file_type().is_file() {
                Some(std::fs::read(e.path()).unwrap())
            } else {
                None
            };
            (rel, content)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Successful extraction
// ---------------------------------------------------------------------------

#[test]
fn test_round_trip_reproduces_tree() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    std::fs::create_dir_all(source.join("ElvUI/Core/Modules")).unwrap();
    std::fs::create_dir_all(source.join("ElvUI_OptionsUI")).unwrap();
    std::fs::create_dir_all(source.join("ElvUI/Media/Empty")).unwrap();
    std::fs::write(source.join("ElvUI/ElvUI.toc"), "## Version: 11.27\n").unwrap();
    std::fs::write(source.join("ElvUI/Core/init.lua"), "local E = {}\n".repeat(500)).unwrap();
    std::fs::write(source.join("ElvUI/Core/Modules/a.lua"), "").unwrap();
    std::fs::write(
        source.join("ElvUI_OptionsUI/logo.tga"),
        (0..=255u8).cycle().take(10_000).collect::<Vec<u8>>(),
    )
    .unwrap();

    let archive = temp.path().join("elvui-11.27.zip");
    zip_directory(&source, &archive);

    let dest = temp.path().join("AddOns");
    let written = ZipExtractor::extract(&archive, &dest).unwrap();

    assert_eq!(snapshot(&dest), snapshot(&source));
    assert_eq!(written.len(), snapshot(&source).len());
}

#[test]
fn test_written_paths_follow_archive_order() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("test.zip");
    create_zip_archive(
        &archive,
        &[
            Entry::File("b.txt", b"b"),
            Entry::Dir("ElvUI/"),
            Entry::File("ElvUI/ElvUI.toc", b"toc"),
            Entry::File("a.txt", b"a"),
        ],
    );

    let dest = temp.path().join("out");
    let written = ZipExtractor::extract(&archive, &dest).unwrap();

    let dest = std::path::absolute(&dest).unwrap();
    assert_eq!(
        written,
        vec![
            dest.join("b.txt"),
            dest.join("ElvUI"),
            dest.join("ElvUI/ElvUI.toc"),
            dest.join("a.txt"),
        ]
    );
    for path in &written {
        assert!(path.starts_with(&dest) && path != &dest);
    }
}

#[test]
fn test_missing_parent_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("test.zip");
    create_zip_archive(&archive, &[Entry::File("deep/nested/dir/file.lua", b"x")]);

    let dest = temp.path().join("not/yet/there");
    ZipExtractor::extract(&archive, &dest).unwrap();

    assert_eq!(
        std::fs::read(dest.join("deep/nested/dir/file.lua")).unwrap(),
        b"x"
    );
}

#[test]
fn test_existing_files_are_truncated() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("AddOns");
    std::fs::create_dir_all(dest.join("ElvUI")).unwrap();
    std::fs::write(dest.join("ElvUI/ElvUI.toc"), "## Version: 11.26 with a long tail\n").unwrap();
    std::fs::write(dest.join("ElvUI/untouched.lua"), "keep").unwrap();

    let archive = temp.path().join("test.zip");
    create_zip_archive(&archive, &[Entry::File("ElvUI/ElvUI.toc", b"## Version: 11.27\n")]);

    ZipExtractor::extract(&archive, &dest).unwrap();

    assert_eq!(
        std::fs::read_to_string(dest.join("ElvUI/ElvUI.toc")).unwrap(),
        "## Version: 11.27\n"
    );
    assert_eq!(
        std::fs::read_to_string(dest.join("ElvUI/untouched.lua")).unwrap(),
        "keep"
    );
}

#[test]
fn test_empty_archive_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("empty.zip");
    create_zip_archive(&archive, &[]);

    let dest = temp.path().join("out");
    let written = ZipExtractor::extract(&archive, &dest).unwrap();

    assert!(written.is_empty());
    assert!(dest.is_dir());
}

#[cfg(unix)]
#[test]
fn test_unix_mode_bits_are_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("modes.zip");
    let file = std::fs::File::create(&archive).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options = ::zip::write::FileOptions::default()
        .compression_method(::zip::CompressionMethod::Stored)
        .unix_permissions(0o750);
    writer.start_file("tool.sh", options).unwrap();
    std::io::Write::write_all(&mut writer, b"#!/bin/sh\n").unwrap();
    writer.finish().unwrap();

    let dest = temp.path().join("out");
    ZipExtractor::extract(&archive, &dest).unwrap();

    let mode = std::fs::metadata(dest.join("tool.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[tokio::test]
async fn test_extract_archive_runs_on_blocking_pool() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("test.zip");
    create_zip_archive(&archive, &[Entry::File("hello.txt", b"hello")]);

    let dest = temp.path().join("out");
    let written = extract_archive(&archive, &dest).await.unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(std::fs::read(dest.join("hello.txt")).unwrap(), b"hello");
}

// ---------------------------------------------------------------------------
// Path escapes
// ---------------------------------------------------------------------------

#[test]
fn test_parent_dir_entry_is_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    create_zip_archive(&archive, &[Entry::File("../evil.txt", b"pwned")]);

    let dest = temp.path().join("dest");
    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    match err {
        Error::PathTraversal { entry, .. } => assert_eq!(entry, "../evil.txt"),
        other => panic!("expected PathTraversal, got {other:?}"),
    }
    assert!(!temp.path().join("evil.txt").exists());
    assert!(snapshot(&dest).is_empty());
}

#[test]
fn test_nested_parent_dir_entry_is_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    create_zip_archive(
        &archive,
        &[Entry::File("ElvUI/../../../evil.txt", b"pwned")],
    );

    let dest = temp.path().join("a/dest");
    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    assert!(matches!(err, Error::PathTraversal { .. }));
    assert!(!temp.path().join("evil.txt").exists());
    assert!(!temp.path().join("a/evil.txt").exists());
}

#[test]
fn test_absolute_entry_is_rejected() {
    let temp = TempDir::new().unwrap();
    let outside = temp.path().join("outside.txt");
    let archive = temp.path().join("evil.zip");
    let absolute_name = outside.to_string_lossy().replace('\\', "/");
    create_zip_archive(&archive, &[Entry::File(&absolute_name, b"pwned")]);

    let dest = temp.path().join("dest");
    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    assert!(matches!(err, Error::PathTraversal { .. }));
    assert!(!outside.exists());
}

#[test]
fn test_sibling_prefix_entry_is_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    create_zip_archive(&archive, &[Entry::File("../dest-evil/x.txt", b"pwned")]);

    let dest = temp.path().join("dest");
    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    assert!(matches!(err, Error::PathTraversal { .. }));
    assert!(!temp.path().join("dest-evil").exists());
}

#[test]
fn test_extraction_stops_at_first_escape_without_rollback() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("mixed.zip");
    create_zip_archive(
        &archive,
        &[
            Entry::File("good.txt", b"good"),
            Entry::File("../evil.txt", b"pwned"),
            Entry::File("after.txt", b"after"),
        ],
    );

    let dest = temp.path().join("dest");
    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    assert!(matches!(err, Error::PathTraversal { .. }));
    assert_eq!(std::fs::read(dest.join("good.txt")).unwrap(), b"good");
    assert!(!dest.join("after.txt").exists());
    assert!(!temp.path().join("evil.txt").exists());
}

// ---------------------------------------------------------------------------
// Open and I/O failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_archive_is_open_error() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("dest");

    let err = ZipExtractor::extract(&temp.path().join("missing.zip"), &dest).unwrap_err();

    assert!(matches!(err, Error::ArchiveOpen { .. }));
    assert!(!dest.exists(), "no side effects before the archive opens");
}

#[test]
fn test_corrupt_archive_is_open_error() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("corrupt.zip");
    std::fs::write(&archive, b"this is not a zip file at all").unwrap();
    let dest = temp.path().join("dest");

    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    match &err {
        Error::ArchiveOpen { archive: path, .. } => assert_eq!(path, &archive),
        other => panic!("expected ArchiveOpen, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn test_file_in_place_of_directory_is_io_error() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("dest");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("ElvUI"), "not a directory").unwrap();

    let archive = temp.path().join("test.zip");
    create_zip_archive(&archive, &[Entry::File("ElvUI/ElvUI.toc", b"toc")]);

    let err = ZipExtractor::extract(&archive, &dest).unwrap_err();

    assert!(matches!(err, Error::ExtractionIo { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_extract_archive_propagates_errors() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    create_zip_archive(&archive, &[Entry::File("../evil.txt", b"pwned")]);

    let err = extract_archive(&archive, &temp.path().join("dest"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "path_traversal");
}
