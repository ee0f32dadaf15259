use super::*;

use tempfile::TempDir;

struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            root: TempDir::new().expect("temp dir"),
        };
        fixture.write("ui/main.yaml", "main:\n  type: window\n");
        fixture.write("styles/main.css", "body {}");
        fixture
    }

    fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, contents).expect("write");
        path
    }

    fn manifest(&self, contents: &str) -> PathBuf {
        self.write("guis.yaml", contents)
    }

    fn output(&self) -> PathBuf {
        self.root.path().join("out")
    }

    fn load(&self, contents: &str) -> Result<Manifest, BuildError> {
        load_manifest(&self.manifest(contents), &self.output())
    }
}

const MINIMAL: &str = "guis:\n  - name: home\n    config: ui/main.yaml\n    stylesheet: styles/main.css\n";

#[test]
fn loads_gui_entries_and_registers_the_stylesheet() {
    let fixture = Fixture::new();
    let manifest = fixture.load(MINIMAL).expect("manifest");

    assert_eq!(manifest.guis.len(), 1);
    let gui = &manifest.guis[0];
    assert_eq!(gui.name, "home");
    assert_eq!(gui.html_output_name, "home.html");
    assert_eq!(gui.stylesheet_path, "styles/main.css");
    assert!(!gui.debug);
    assert_eq!(gui.source_definition_file, fixture.root.path().join("ui/main.yaml"));
    assert_eq!(
        manifest.dependencies.get(&fixture.root.path().join("styles/main.css")),
        Some(&PathBuf::from("styles/main.css"))
    );
    assert!(fixture.output().is_dir());
}

#[test]
fn missing_guis_list_is_rejected() {
    let fixture = Fixture::new();
    assert!(matches!(fixture.load("other: 1\n"), Err(BuildError::MissingGuis)));
    assert!(matches!(fixture.load("guis: home\n"), Err(BuildError::MissingGuis)));
}

#[test]
fn missing_required_field_is_named() {
    let fixture = Fixture::new();
    let error = fixture
        .load("guis:\n  - name: home\n    stylesheet: styles/main.css\n")
        .expect_err("missing config");
    assert!(matches!(error, BuildError::MissingField { field: "config" }));
    assert!(error.to_string().contains("`config`"));
}

#[test]
fn mistyped_required_field_is_named() {
    let fixture = Fixture::new();
    let error = fixture
        .load("guis:\n  - name: [home]\n    config: ui/main.yaml\n    stylesheet: styles/main.css\n")
        .expect_err("mistyped name");
    assert!(matches!(error, BuildError::FieldNotString { field: "name" }));
}

#[test]
fn missing_source_and_stylesheet_files_are_rejected() {
    let fixture = Fixture::new();
    assert!(matches!(
        fixture.load("guis:\n  - name: home\n    config: ui/nope.yaml\n    stylesheet: styles/main.css\n"),
        Err(BuildError::SourceNotFound { .. })
    ));
    assert!(matches!(
        fixture.load("guis:\n  - name: home\n    config: ui/main.yaml\n    stylesheet: styles/nope.css\n"),
        Err(BuildError::StylesheetNotFound { .. })
    ));
}

#[test]
fn existing_html_output_is_rejected() {
    let fixture = Fixture::new();
    fixture.write("out/home.html", "old");
    assert!(matches!(
        fixture.load(MINIMAL),
        Err(BuildError::HtmlExists { ref file }) if file == "home.html"
    ));
}

#[test]
fn duplicate_gui_names_are_rejected() {
    let fixture = Fixture::new();
    let contents = format!("{MINIMAL}  - name: home\n    config: ui/main.yaml\n    stylesheet: styles/main.css\n");
    assert!(matches!(
        fixture.load(&contents),
        Err(BuildError::DuplicateGui { ref name }) if name == "home"
    ));
}

#[test]
fn debug_flag_must_be_boolean() {
    let fixture = Fixture::new();
    let manifest = fixture
        .load(&format!("{MINIMAL}    debug: true\n"))
        .expect("debug manifest");
    assert!(manifest.guis[0].debug);

    assert!(matches!(
        fixture.load(&format!("{MINIMAL}    debug: sometimes\n")),
        Err(BuildError::DebugNotBool { .. })
    ));
    assert!(matches!(
        fixture.load(&format!("{MINIMAL}    debug: [true]\n")),
        Err(BuildError::DebugNotBool { .. })
    ));
}

#[test]
fn dependency_patterns_are_expanded_relative_to_the_manifest() {
    let fixture = Fixture::new();
    fixture.write("assets/logo.png", "png");
    fixture.write("assets/icons/close.png", "png");
    fixture.write("assets/notes.txt", "txt");

    let manifest = fixture
        .load(&format!("{MINIMAL}    dependencies:\n      - assets/*.png\n"))
        .expect("manifest");

    let destinations: Vec<&PathBuf> = manifest.dependencies.values().collect();
    assert_eq!(
        destinations,
        vec![
            &PathBuf::from("assets/icons/close.png"),
            &PathBuf::from("assets/logo.png"),
            &PathBuf::from("styles/main.css"),
        ]
    );
}

#[test]
fn dependency_pattern_without_matches_is_named() {
    let fixture = Fixture::new();
    let error = fixture
        .load(&format!("{MINIMAL}    dependencies:\n      - fonts/*.woff\n"))
        .expect_err("no fonts");
    assert!(matches!(error, BuildError::Dependency { ref pattern, .. } if pattern == "fonts/*.woff"));
}

#[test]
fn dependencies_must_be_a_list_of_strings() {
    let fixture = Fixture::new();
    assert!(matches!(
        fixture.load(&format!("{MINIMAL}    dependencies: styles/main.css\n")),
        Err(BuildError::DependenciesNotList { .. })
    ));
    assert!(matches!(
        fixture.load(&format!("{MINIMAL}    dependencies:\n      - {{a: b}}\n")),
        Err(BuildError::DependencyNotString { .. })
    ));
    assert!(fixture.load(&format!("{MINIMAL}    dependencies:\n")).is_ok());
}

#[test]
fn output_location_occupied_by_a_file_is_rejected() {
    let fixture = Fixture::new();
    fixture.write("out", "not a directory");
    assert!(matches!(
        fixture.load(MINIMAL),
        Err(BuildError::OutputNotDirectory { .. })
    ));
}

#[test]
fn gui_names_must_stay_inside_the_output_directory() {
    let fixture = Fixture::new();
    for name in ["../escaped", "nested/home", "/abs", "..", "."] {
        let contents = format!(
            "guis:\n  - name: '{name}'\n    config: ui/main.yaml\n    stylesheet: styles/main.css\n"
        );
        assert!(
            matches!(
                fixture.load(&contents),
                Err(BuildError::InvalidGuiName { name: ref rejected }) if rejected == name
            ),
            "{name} should be rejected"
        );
    }
    assert!(!fixture.root.path().join("escaped.html").exists());
}
