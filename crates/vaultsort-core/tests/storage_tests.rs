use std::fs;
use std::path::Path;

use tempfile::TempDir;
use vaultsort_core::{FileStorage, StorageError, VaultStorage};

fn create_test_vault() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("6_Lore/Characters")).unwrap();
    fs::create_dir_all(root.join("_indexes")).unwrap();
    fs::create_dir_all(root.join(".obsidian")).unwrap();
    fs::write(root.join("b.md"), "b").unwrap();
    fs::write(root.join("a.md"), "a").unwrap();
    fs::write(root.join("notes.txt"), "not a note").unwrap();
    fs::write(root.join("6_Lore/Characters/Mira.md"), "mira").unwrap();
    fs::write(root.join("_indexes/_lore.md"), "# Index for #lore").unwrap();
    fs::write(root.join(".obsidian/workspace.md"), "{}").unwrap();
    temp_dir
}

fn relative(root: &Path, paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_list_notes_sorted_and_filtered() {
    let temp = create_test_vault();
    let root = temp.path();

    let notes = FileStorage::new()
        .list_notes(root, "md", Path::new("_indexes"))
        .unwrap();
    assert_eq!(
        relative(root, &notes),
        vec![
            ".obsidian/workspace.md",
            "6_Lore/Characters/Mira.md",
            "a.md",
            "b.md"
        ]
    );
}

#[test]
fn test_list_notes_skip_hidden() {
    let temp = create_test_vault();
    let root = temp.path();

    let notes = FileStorage::new()
        .skip_hidden(true)
        .list_notes(root, "md", Path::new("_indexes"))
        .unwrap();
    assert_eq!(
        relative(root, &notes),
        vec!["6_Lore/Characters/Mira.md", "a.md", "b.md"]
    );
}

#[test]
fn test_list_files_is_flat() {
    let temp = create_test_vault();
    let root = temp.path();

    let files = FileStorage::new().list_files(&root.join("_indexes"), "md").unwrap();
    assert_eq!(relative(root, &files), vec!["_indexes/_lore.md"]);

    let missing = FileStorage::new()
        .list_files(&root.join("nowhere"), "md")
        .unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_read_write_remove() {
    let temp = TempDir::new().unwrap();
    let storage = FileStorage::new();
    let path = temp.path().join("note.md");

    storage.write(&path, "---\ntags: [lore]\n---\nBody").unwrap();
    assert_eq!(
        storage.read_to_string(&path).unwrap(),
        "---\ntags: [lore]\n---\nBody"
    );
    assert!(storage.exists(&path));

    storage.remove_file(&path).unwrap();
    assert!(!storage.exists(&path));
    assert!(matches!(
        storage.read_to_string(&path),
        Err(StorageError::Io { .. })
    ));
}

#[test]
fn test_move_conflict_leaves_both_files() {
    let temp = create_test_vault();
    let root = temp.path();
    fs::write(root.join("Mira.md"), "duplicate").unwrap();

    let err = FileStorage::new()
        .move_file(&root.join("Mira.md"), &root.join("6_Lore/Characters"))
        .unwrap_err();

    assert!(err.is_destination_conflict());
    assert_eq!(fs::read_to_string(root.join("Mira.md")).unwrap(), "duplicate");
    assert_eq!(
        fs::read_to_string(root.join("6_Lore/Characters/Mira.md")).unwrap(),
        "mira"
    );
}
