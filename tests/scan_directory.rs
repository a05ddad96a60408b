use emoji_batch::scan::scan_directory;

#[test]
fn walks_recursively_in_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("b.png"), b"x").expect("write");
    std::fs::write(dir.path().join("a.png"), b"x").expect("write");
    std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
    std::fs::write(dir.path().join("sub").join("c.gif"), b"x").expect("write");
    std::fs::write(dir.path().join("sub").join("notes.txt"), b"x").expect("write");

    let items = scan_directory(dir.path()).expect("scan");
    let names: Vec<String> = items
        .iter()
        .map(|i| {
            i.path
                .file_name()
                .expect("file name")
                .to_string_lossy()
                .into_owned()
        })
        .collect();

    // Files only, siblings in name order, subdirectories included.
    assert_eq!(names, vec!["a.png", "b.png", "c.gif", "notes.txt"]);
}

#[test]
fn rejects_a_missing_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope");
    assert!(scan_directory(&missing).is_err());
}
