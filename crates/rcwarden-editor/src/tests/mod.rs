//! Crate-level unit and behavioural tests for the resource file editor.

use std::fs;
use std::path::PathBuf;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{EditorError, ShellEntry, ShellResourceFile};


struct Scratch {
    _dir: TempDir,
    path: PathBuf,
}

impl Scratch {
    fn with_content(content: &str) -> Self {
        let scratch = Self::empty();
        fs::write(&scratch.path, content).expect("seed resource file");
        scratch
    }

    fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(".bashrc");
        Self { _dir: dir, path }
    }

    fn rc(&self) -> ShellResourceFile {
        ShellResourceFile::new(&self.path)
    }

    fn read(&self) -> String {
        fs::read_to_string(&self.path).expect("read resource file")
    }
}

#[fixture]
fn seeded() -> Scratch {
    Scratch::with_content("# managed by hand\nexport EDITOR=vim\n")
}

#[rstest]
fn add_alias_creates_missing_file() {
    let scratch = Scratch::empty();
    let line = scratch.rc().add_alias("ll", "ls -l").expect("add alias");
    assert_eq!(line, "alias ll='ls -l'");
    assert_eq!(scratch.read(), "alias ll='ls -l'\n");
}

#[rstest]
fn add_alias_twice_keeps_both_lines(seeded: Scratch) {
    let rc = seeded.rc();
    rc.add_alias("ll", "ls -l").expect("first add");
    rc.add_alias("ll", "ls -la").expect("second add");
    assert_eq!(
        seeded.read(),
        "# managed by hand\nexport EDITOR=vim\nalias ll='ls -l'\nalias ll='ls -la'\n"
    );
}

#[rstest]
fn remove_alias_drops_every_match_and_keeps_other_lines(seeded: Scratch) {
    let rc = seeded.rc();
    rc.add_alias("ll", "ls -l").expect("first add");
    rc.add_alias("la", "ls -a").expect("unrelated add");
    rc.add_alias("ll", "ls -la").expect("second add");

    let removed = rc.remove_alias("ll").expect("remove alias");

    assert_eq!(removed, 2);
    assert_eq!(
        seeded.read(),
        "# managed by hand\nexport EDITOR=vim\nalias la='ls -a'\n"
    );
}

#[rstest]
fn remove_missing_alias_leaves_file_untouched(seeded: Scratch) {
    let before = fs::metadata(&seeded.path)
        .and_then(|meta| meta.modified())
        .expect("mtime before");

    let removed = seeded.rc().remove_alias("nope").expect("remove succeeds");

    assert_eq!(removed, 0);
    assert_eq!(seeded.read(), "# managed by hand\nexport EDITOR=vim\n");
    let after = fs::metadata(&seeded.path)
        .and_then(|meta| meta.modified())
        .expect("mtime after");
    assert_eq!(before, after);
}

#[rstest]
fn remove_on_missing_file_creates_it_empty() {
    let scratch = Scratch::empty();
    assert_eq!(scratch.rc().remove_export("PATH").expect("remove"), 0);
    assert_eq!(scratch.read(), "");
}

#[rstest]
fn export_round_trip_restores_original(seeded: Scratch) {
    let rc = seeded.rc();
    let before = seeded.read();

    rc.add_export("JAVA_HOME", "/usr/lib/jvm/java-21")
        .expect("add export");
    assert!(seeded.read().contains("export JAVA_HOME=/usr/lib/jvm/java-21\n"));
    rc.remove_export("JAVA_HOME").expect("remove export");

    assert_eq!(seeded.read(), before);
}

#[rstest]
fn prefix_match_does_not_touch_longer_names(seeded: Scratch) {
    let rc = seeded.rc();
    rc.add_export("EDITOR_OPTS", "-n").expect("add export");

    rc.remove_export("EDITOR").expect("remove export");

    assert_eq!(seeded.read(), "# managed by hand\nexport EDITOR_OPTS=-n\n");
}

#[rstest]
fn append_after_unterminated_line_starts_a_new_line() {
    let scratch = Scratch::with_content("export A=1");
    scratch.rc().add_alias("g", "git").expect("add alias");
    assert_eq!(scratch.read(), "export A=1\nalias g='git'\n");
}

#[cfg(unix)]
#[rstest]
fn rewrite_preserves_permissions(seeded: Scratch) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(&seeded.path, fs::Permissions::from_mode(0o640)).expect("chmod");
    let rc = seeded.rc();
    rc.add_alias("ll", "ls -l").expect("add");
    rc.remove_alias("ll").expect("remove");

    let mode = fs::metadata(&seeded.path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[cfg(unix)]
#[rstest]
fn rewrite_follows_symlinked_resource_file(seeded: Scratch) {
    let link = seeded.path.with_file_name("linked_bashrc");
    std::os::unix::fs::symlink(&seeded.path, &link).expect("symlink");
    let rc = ShellResourceFile::new(&link);
    rc.add_alias("ll", "ls -l").expect("add through link");

    rc.remove_alias("ll").expect("remove through link");

    assert!(fs::symlink_metadata(&link).expect("link metadata").file_type().is_symlink());
    assert_eq!(seeded.read(), "# managed by hand\nexport EDITOR=vim\n");
}

#[rstest]
fn missing_parent_directory_is_an_io_error() {
    let scratch = Scratch::empty();
    let rc = ShellResourceFile::new(scratch.path.join("nested").join(".bashrc"));
    let error = rc.add(&ShellEntry::alias("ll", "ls")).expect_err("should fail");
    assert!(matches!(error, EditorError::Create { .. }));
    assert!(error.path().ends_with(".bashrc"));
}

#[rstest]
fn existing_path_that_cannot_be_opened_is_an_open_error() {
    let scratch = Scratch::empty();
    fs::create_dir(&scratch.path).expect("occupy the path with a directory");

    let error = scratch
        .rc()
        .add(&ShellEntry::export("EDITOR", "vim"))
        .expect_err("a directory cannot be appended to");

    assert!(matches!(error, EditorError::Open { .. }));
    assert!(error.to_string().starts_with("failed to open"));
}
