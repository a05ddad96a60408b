use emoji_batch::util::{emoji_name, renamed};
use std::path::Path;

#[test]
fn slug_plus_type_suffix() {
    assert_eq!(emoji_name(Path::new("/img/Party Parrot.PNG"), "png"), "party_parrot-png");
    assert_eq!(emoji_name(Path::new("/img/blob+1.gif"), "gif"), "blob+1-gif");
}

#[test]
fn compatibility_forms_are_normalized() {
    // Fullwidth characters fold to their ASCII forms under NFKC.
    assert_eq!(emoji_name(Path::new("/img/ｐａｒｔｙ.png"), "png"), "party-png");
}

#[test]
fn unusable_stem_falls_back() {
    assert_eq!(emoji_name(Path::new("/img/###.png"), "png"), "emoji-png");
}

#[test]
fn rename_appends_suffix_again() {
    assert_eq!(renamed("party-png", "png"), "party-png-png");
}
