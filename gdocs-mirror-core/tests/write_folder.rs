use std::fs;
use std::path::Path;

use gdocs_mirror_core::model::{Document, Folder, LastModifyingUser};
use gdocs_mirror_core::writer::write_folder;
use gdocs_mirror_core::SyncError;
use tempfile::tempdir;

fn doc(id: &str, name: &str, body: &str) -> Document {
    Document::new(
        id,
        name,
        Some("overview".to_string()),
        "2024-01-01T00:00:00Z",
        LastModifyingUser::new("Jane Doe"),
        body.as_bytes().to_vec(),
    )
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn writes_sanitized_paths_with_raw_title_in_header() {
    let out = tempdir().unwrap();
    let folder = Folder::new(
        "F1",
        "Q&A: Notes!",
        vec![doc("D1", "Intro (draft)", "# Hello")],
        vec![],
    );

    let stats = write_folder(&folder, out.path()).expect("write should succeed");

    let file = out.path().join("QA Notes").join("Intro draft.md");
    let written = fs::read_to_string(&file).unwrap();
    assert_eq!(
        written,
        "---\ntitle: Intro (draft)\ndescription: overview\nupdated: 2024-01-01T00:00:00Z\nlastModifyingUser: Jane\n---\n\n# Hello"
    );
    assert_eq!(stats.files_written, 1);
    assert_eq!(stats.directories_created, 1);
}

#[test]
fn file_bytes_are_header_followed_by_content() {
    let out = tempdir().unwrap();
    let document = doc("D1", "Binary-ish", "caf\u{e9} \u{1F600}\n");
    let folder = Folder::new("F1", "Root", vec![document.clone()], vec![]);

    write_folder(&folder, out.path()).unwrap();

    let bytes = fs::read(out.path().join("Root").join("Binaryish.md")).unwrap();
    let mut expected = document.metadata_header().into_bytes();
    expected.extend_from_slice(&document.content);
    assert_eq!(bytes, expected);
}

#[test]
fn empty_folder_creates_nothing() {
    let out = tempdir().unwrap();
    let folder = Folder::new("F1", "Empty", vec![], vec![]);

    let stats = write_folder(&folder, out.path()).unwrap();

    assert!(entries(out.path()).is_empty());
    assert_eq!(stats.files_written, 0);
}

#[test]
fn branch_of_empty_subfolders_creates_nothing() {
    let out = tempdir().unwrap();
    let empty = Folder::new("F2", "Empty child", vec![], vec![]);
    let folder = Folder::new("F1", "Parent", vec![], vec![empty]);

    write_folder(&folder, out.path()).unwrap();

    assert!(entries(out.path()).is_empty());
}

#[test]
fn one_directory_with_exactly_one_file_per_document() {
    let out = tempdir().unwrap();
    let folder = Folder::new(
        "F1",
        "Docs",
        vec![doc("D1", "One", "1"), doc("D2", "Two", "2"), doc("D3", "Three", "3")],
        vec![Folder::new("F2", "Empty", vec![], vec![])],
    );

    write_folder(&folder, out.path()).unwrap();

    assert_eq!(entries(out.path()), ["Docs"]);
    assert_eq!(
        entries(&out.path().join("Docs")),
        ["One.md", "Three.md", "Two.md"]
    );
}

#[test]
fn document_less_parent_is_created_as_ancestor_of_populated_child() {
    let out = tempdir().unwrap();
    let child = Folder::new("F2", "Child", vec![doc("D1", "Deep", "x")], vec![]);
    let folder = Folder::new("F1", "Parent", vec![], vec![child]);

    let stats = write_folder(&folder, out.path()).unwrap();

    assert!(out.path().join("Parent").join("Child").join("Deep.md").is_file());
    assert_eq!(entries(&out.path().join("Parent")), ["Child"]);
    assert_eq!(stats.directories_created, 1);
}

#[test]
fn second_write_overwrites_with_identical_bytes() {
    let out = tempdir().unwrap();
    let folder = Folder::new("F1", "Root", vec![doc("D1", "Page", "body")], vec![]);
    let path = out.path().join("Root").join("Page.md");

    write_folder(&folder, out.path()).unwrap();
    let first = fs::read(&path).unwrap();
    fs::write(&path, b"stale local edit that is much longer than the original").unwrap();
    let stats = write_folder(&folder, out.path()).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(stats.directories_created, 0);
}

#[test]
fn document_name_of_only_punctuation_is_an_invalid_path() {
    let out = tempdir().unwrap();
    let folder = Folder::new("F1", "Root", vec![doc("D1", "???", "x")], vec![]);

    let err = write_folder(&folder, out.path()).unwrap_err();

    assert!(matches!(err, SyncError::InvalidPath { ref display_name, .. } if display_name == "???"));
}

#[test]
fn folder_name_of_only_punctuation_is_an_invalid_path_when_it_holds_documents() {
    let out = tempdir().unwrap();
    let populated = Folder::new("F1", "...", vec![doc("D1", "Page", "x")], vec![]);
    let empty = Folder::new("F2", "...", vec![], vec![]);

    assert!(matches!(
        write_folder(&populated, out.path()),
        Err(SyncError::InvalidPath { .. })
    ));
    assert!(write_folder(&empty, out.path()).is_ok());
}

#[cfg(unix)]
#[test]
fn unwritable_parent_surfaces_io_error_with_path() {
    let out = tempdir().unwrap();
    let blocker = out.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();
    let folder = Folder::new("F1", "Root", vec![doc("D1", "Page", "x")], vec![]);

    let err = write_folder(&folder, &blocker).unwrap_err();

    match err {
        SyncError::Io { path, .. } => assert_eq!(path, blocker.join("Root")),
        other => panic!("expected Io error, got {other:?}"),
    }
}
