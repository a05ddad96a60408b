use emoji_batch::{
    policy::{Decision, decide, image_extension},
    progress::{ProgressEntry, ProgressLog, ProgressTag},
};
use std::path::Path;

fn log_of(entries: &[(ProgressTag, &str)]) -> ProgressLog {
    ProgressLog::from_entries(
        entries
            .iter()
            .map(|(tag, path)| ProgressEntry::new(*tag, *path))
            .collect(),
    )
}

#[test]
fn image_extension_is_case_insensitive() {
    assert_eq!(image_extension(Path::new("a.PNG")).as_deref(), Some("png"));
    assert_eq!(image_extension(Path::new("b.JpEg")).as_deref(), Some("jpeg"));
    assert_eq!(image_extension(Path::new("c.txt")), None);
    assert_eq!(image_extension(Path::new("noext")), None);
}

#[test]
fn wrong_type_regardless_of_log() {
    let with_entry = log_of(&[(ProgressTag::Uploaded, "/img/b.txt")]);
    assert_eq!(
        decide(Path::new("/img/b.txt"), &ProgressLog::default()),
        Decision::SkipWrongType
    );
    assert_eq!(
        decide(Path::new("/img/b.txt"), &with_entry),
        Decision::SkipWrongType
    );
}

#[test]
fn unseen_image_is_eligible() {
    let log = log_of(&[(ProgressTag::Uploaded, "/img/other.png")]);
    assert_eq!(decide(Path::new("/img/a.png"), &log), Decision::Eligible);
}

#[test]
fn bare_success_entry_skips() {
    let log = log_of(&[(ProgressTag::Uploaded, "/img/a.png")]);
    assert_eq!(
        decide(Path::new("/img/a.png"), &log),
        Decision::SkipAlreadyDone
    );
}

#[test]
fn duplicate_entry_skips() {
    let log = log_of(&[(ProgressTag::Duplicate, "/img/c.gif")]);
    assert_eq!(
        decide(Path::new("/img/c.gif"), &log),
        Decision::SkipAlreadyDuplicate
    );
}

#[test]
fn failed_items_are_never_retried() {
    // A lone Failed entry is enough; no other entry for the path exists.
    let log = log_of(&[(ProgressTag::Failed, "/img/broken.jpg")]);
    assert_eq!(
        decide(Path::new("/img/broken.jpg"), &log),
        Decision::SkipPreviouslyFailed
    );
}

#[test]
fn recorded_timeout_gates_resubmission() {
    let log = log_of(&[(ProgressTag::Timeout, "/img/slow.png")]);
    assert_eq!(
        decide(Path::new("/img/slow.png"), &log),
        Decision::SkipEarlierTimeout
    );
}

#[test]
fn first_entry_for_a_path_wins() {
    let log = log_of(&[
        (ProgressTag::Failed, "/img/a.png"),
        (ProgressTag::Uploaded, "/img/a.png"),
    ]);
    assert_eq!(
        decide(Path::new("/img/a.png"), &log),
        Decision::SkipPreviouslyFailed
    );
}
