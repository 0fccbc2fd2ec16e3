use std::{fs, path::PathBuf};

use gradecheck::{SpecError, TestSpec, spec};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("gradecheck-specs-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn unreadable_spec_is_reported() {
    let root = temp_root();
    let err = TestSpec::load(root.join("missing.json")).unwrap_err();
    assert!(matches!(err, SpecError::Unreadable { .. }));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn directory_loading_is_sorted_and_filtered() {
    let root = temp_root();
    let case = r#"{ "cases": [ { "name": "c", "code": ">>> 1\n1" } ] }"#;
    fs::write(root.join("b.json"), case).unwrap();
    fs::write(root.join("a.json"), case).unwrap();
    fs::write(root.join("notes.txt"), "not a spec").unwrap();

    let specs = spec::load_dir(&root, "json").expect("load");
    let names: Vec<&str> = specs.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(specs[0].path(), root.join("a.json"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn empty_directory_is_an_error() {
    let root = temp_root();
    let err = spec::load_dir(&root, "json").unwrap_err();
    assert!(matches!(err, SpecError::NoSpecs { .. }));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn one_bad_spec_does_not_change_the_others() {
    let root = temp_root();
    fs::write(root.join("good.json"), r#"{ "cases": [ { "name": "c", "code": ">>> 1\n1" } ] }"#)
        .unwrap();
    fs::write(root.join("bad.json"), r#"{ "cases": [ { "name": "c" } ] }"#).unwrap();

    assert!(spec::load_dir(&root, "json").is_err());
    let good = TestSpec::load(root.join("good.json")).expect("good spec still loads");
    assert_eq!(good.len(), 1);

    let _ = fs::remove_dir_all(root);
}
