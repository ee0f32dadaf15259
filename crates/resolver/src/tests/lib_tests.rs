use super::*;

use std::fs;

use tempfile::TempDir;

fn tree() -> TempDir {
    let root = TempDir::new().expect("temp dir");
    for relative in [
        "assets/logo.png",
        "assets/icon.png",
        "assets/readme.txt",
        "assets/img/banner.png",
        "fonts/a1.woff",
        "fonts/a22.woff",
    ] {
        let path = root.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, relative).expect("write");
    }
    root
}

#[test]
fn literal_file_resolves_to_itself() {
    let root = tree();
    let path = root.path().join("assets/logo.png");
    assert_eq!(resolve(&path).expect("resolve"), vec![path]);
}

#[test]
fn literal_directory_resolves_to_itself() {
    let root = tree();
    let path = root.path().join("assets");
    assert_eq!(resolve(&path).expect("resolve"), vec![path]);
}

#[test]
fn star_matches_across_nested_directories() {
    let root = tree();
    let found = resolve(&root.path().join("assets/*.png")).expect("resolve");
    assert_eq!(
        found,
        vec![
            root.path().join("assets/icon.png"),
            root.path().join("assets/img/banner.png"),
            root.path().join("assets/logo.png"),
        ]
    );
}

#[test]
fn question_mark_matches_exactly_one_character() {
    let root = tree();
    let found = resolve(&root.path().join("fonts/a?.woff")).expect("resolve");
    assert_eq!(found, vec![root.path().join("fonts/a1.woff")]);
}

#[test]
fn pattern_dots_are_literal() {
    let root = tree();
    let found = resolve(&root.path().join("assets/readme?txt*")).expect("resolve");
    assert_eq!(found, vec![root.path().join("assets/readme.txt")]);
    assert!(matches!(
        resolve(&root.path().join("assets/*.pn")),
        Err(ResolveError::NoMatches { .. })
    ));
}

#[test]
fn missing_literal_path_is_an_error() {
    let root = tree();
    let error = resolve(&root.path().join("missing.css")).expect_err("missing");
    assert!(error.to_string().contains("missing.css"));
}

#[test]
fn wildcard_under_missing_directory_is_an_error() {
    let root = tree();
    assert!(matches!(
        resolve(&root.path().join("nowhere/*.css")),
        Err(ResolveError::Walk { .. })
    ));
}
