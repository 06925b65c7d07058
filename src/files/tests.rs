use super::*;
use tempfile::TempDir;

fn toolkit() -> (TempDir, FileToolkit) {
    let dir = TempDir::new().unwrap();
    let toolkit = FileToolkit::new(dir.path());
    (dir, toolkit)
}

#[test]
fn test_save_file_creates_missing_parent_directories() {
    let (dir, files) = toolkit();

    let result = files.save_file("hello", "nested/deeper/note.txt", true);

    assert_eq!(result, "nested/deeper/note.txt");
    let written = std::fs::read_to_string(dir.path().join("nested/deeper/note.txt")).unwrap();
    assert_eq!(written, "hello");
}

#[test]
fn test_save_file_respects_overwrite_flag() {
    let (dir, files) = toolkit();
    files.save_file("first", "a.txt", true);

    let result = files.save_file("second", "a.txt", false);

    assert_eq!(result, "File a.txt already exists");
    assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "first");
}

#[test]
fn test_read_missing_file_returns_error_text() {
    let (_dir, files) = toolkit();
    let result = files.read_file("nope.txt");
    assert!(result.starts_with("Error reading file:"), "{}", result);
}

#[test]
fn test_read_file_round_trip() {
    let (_dir, files) = toolkit();
    files.save_file("line one\nline two", "doc.md", true);
    assert_eq!(files.read_file("doc.md"), "line one\nline two");
}

#[test]
fn test_search_files_with_glob() {
    let (_dir, files) = toolkit();
    files.save_file("", "src/main.rs", true);
    files.save_file("", "src/lib.rs", true);
    files.save_file("", "README.md", true);

    let result: serde_json::Value = serde_json::from_str(&files.search_files("**/*.rs")).unwrap();
    assert_eq!(result["matches_found"], 2);

    assert_eq!(files.search_files("  "), "Error: Pattern cannot be empty");
}

#[test]
fn test_find_files_by_extension_adds_dot() {
    let (_dir, files) = toolkit();
    files.save_file("", "a/b/c.toml", true);

    let result: serde_json::Value =
        serde_json::from_str(&files.find_files_by_extension("toml")).unwrap();
    assert_eq!(result["matches_found"], 1);
    assert_eq!(result["pattern"], "**/*.toml");
}

#[test]
fn test_list_directory_hides_dotfiles_by_default() {
    let (_dir, files) = toolkit();
    files.save_file("", ".env", true);
    files.save_file("", "visible.txt", true);
    files.create_directory("sub", true);

    let listing: serde_json::Value =
        serde_json::from_str(&files.list_directory(None, false)).unwrap();
    assert_eq!(listing["total_items"], 2);
    // 目录排在文件之前
    assert_eq!(listing["items"][0]["type"], "directory");

    let with_hidden: serde_json::Value =
        serde_json::from_str(&files.list_directory(None, true)).unwrap();
    assert_eq!(with_hidden["total_items"], 3);
}

#[test]
fn test_list_directory_reports_missing_directory() {
    let (_dir, files) = toolkit();
    let result = files.list_directory(Some("ghost"), false);
    assert!(result.starts_with("Error: Directory"), "{}", result);
    assert!(result.ends_with("does not exist"));
}

#[test]
fn test_directory_tree_truncates_at_max_depth() {
    let (_dir, files) = toolkit();
    files.save_file("x", "a/b/c/d.txt", true);

    let tree: serde_json::Value =
        serde_json::from_str(&files.list_directory_tree(None, 1)).unwrap();
    let a = &tree["children"][0];
    assert_eq!(a["name"], "a");
    assert_eq!(a["children"][0]["truncated"], true);
}

#[test]
fn test_change_directory_moves_base_for_clones() {
    let (dir, files) = toolkit();
    files.create_directory("work", true);
    let shared = files.clone();

    let message = files.change_directory("work");
    assert!(message.starts_with("Changed base directory to:"));

    let expected = dir.path().join("work").canonicalize().unwrap();
    assert_eq!(shared.base_dir(), expected);
    assert_eq!(shared.get_current_directory(), expected.display().to_string());

    assert!(files.change_directory("missing").starts_with("Error: Directory 'missing'"));
}

#[test]
fn test_directory_size_counts_files_and_dirs() {
    let (_dir, files) = toolkit();
    files.save_file("12345", "a/one.txt", true);
    files.save_file("123", "two.txt", true);

    let size: serde_json::Value = serde_json::from_str(&files.get_directory_size(None)).unwrap();
    assert_eq!(size["total_size_bytes"], 8);
    assert_eq!(size["file_count"], 2);
    assert_eq!(size["directory_count"], 1);
}

#[test]
fn test_walk_directory_respects_max_files() {
    let (_dir, files) = toolkit();
    for i in 0..5 {
        files.save_file("", &format!("f{}.txt", i), true);
    }

    let walk: serde_json::Value = serde_json::from_str(&files.walk_directory(None, 3)).unwrap();
    assert_eq!(walk["truncated"], true);
    assert_eq!(walk["total_items"], 3);
}

#[test]
fn test_copy_move_and_delete() {
    let (dir, files) = toolkit();
    files.save_file("data", "src.txt", true);

    assert_eq!(
        files.copy_file("src.txt", "backup/copy.txt"),
        "File copied successfully from 'src.txt' to 'backup/copy.txt'"
    );
    assert_eq!(
        files.move_file("src.txt", "moved/src.txt"),
        "File moved successfully from 'src.txt' to 'moved/src.txt'"
    );
    assert!(!dir.path().join("src.txt").exists());
    assert!(dir.path().join("moved/src.txt").exists());

    assert_eq!(
        files.copy_file("src.txt", "x.txt"),
        "Error: Source file 'src.txt' does not exist"
    );

    assert_eq!(
        files.delete_file("backup"),
        "Error: 'backup' is a directory, use delete_directory instead"
    );
    assert_eq!(files.delete_file("moved/src.txt"), "File 'moved/src.txt' deleted successfully");
}

#[test]
fn test_delete_directory_requires_recursive_for_non_empty() {
    let (dir, files) = toolkit();
    files.save_file("x", "full/file.txt", true);

    let result = files.delete_directory("full", false);
    assert!(result.starts_with("Error deleting directory:"), "{}", result);

    assert_eq!(
        files.delete_directory("full", true),
        "Directory 'full' and all contents deleted successfully"
    );
    assert!(!dir.path().join("full").exists());
}

#[test]
fn test_check_path_exists_and_file_info() {
    let (_dir, files) = toolkit();
    files.save_file("abc", "info.rs", true);

    let check: serde_json::Value = serde_json::from_str(&files.check_path_exists("info.rs")).unwrap();
    assert_eq!(check["exists"], true);
    assert_eq!(check["type"], "file");
    assert_eq!(check["readable"], true);

    let missing: serde_json::Value =
        serde_json::from_str(&files.check_path_exists("missing")).unwrap();
    assert_eq!(missing["exists"], false);
    assert!(missing["type"].is_null());

    let info: serde_json::Value = serde_json::from_str(&files.get_file_info("info.rs")).unwrap();
    assert_eq!(info["size"], 3);
    assert_eq!(info["extension"], ".rs");
    assert_eq!(info["stem"], "info");

    assert_eq!(files.get_file_info("missing"), "Error: 'missing' does not exist");
}
