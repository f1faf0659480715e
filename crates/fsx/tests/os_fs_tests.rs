//! End-to-end tests against the host file system
//!
//! Each test works inside its own temporary directory, reached through
//! ContainedFs over OsFs the way a sandboxed tool would.

use fsx::{
    BaseDir, ChdirFs, ContainedFs, FileSystem, FileType, O_APPEND, O_CREATE, O_RDONLY, O_WRONLY,
    OsFs,
};
use pretty_assertions::assert_eq;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn sandbox() -> (TempDir, ContainedFs) {
    let dir = tempfile::tempdir().unwrap();
    let fs = ContainedFs::new(OsFs::shared(), dir.path());
    (dir, fs)
}

fn write(fs: &dyn FileSystem, path: &str, content: &str) {
    let mut file = fs.create(Path::new(path)).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.close().unwrap();
}

fn read(fs: &dyn FileSystem, path: &str) -> String {
    let mut file = fs.open(Path::new(path)).unwrap();
    let mut buf = String::new();
    file.read_to_string(&mut buf).unwrap();
    buf
}

#[test]
fn create_write_read() {
    let (dir, fs) = sandbox();

    write(&fs, "hello.txt", "hello world");

    assert_eq!(read(&fs, "hello.txt"), "hello world");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("hello.txt")).unwrap(),
        "hello world"
    );
}

#[test]
fn create_truncates() {
    let (_dir, fs) = sandbox();
    write(&fs, "f", "a long first version");
    write(&fs, "f", "short");
    assert_eq!(read(&fs, "f"), "short");
}

#[test]
fn open_file_append() {
    let (_dir, fs) = sandbox();
    write(&fs, "log", "one\n");

    let mut file = fs
        .open_file(Path::new("log"), O_WRONLY | O_APPEND | O_CREATE, 0o644)
        .unwrap();
    file.write_all(b"two\n").unwrap();
    file.close().unwrap();

    assert_eq!(read(&fs, "log"), "one\ntwo\n");
}

#[test]
fn open_file_create_mode() {
    let (_dir, fs) = sandbox();
    let file = fs
        .open_file(Path::new("secret"), O_WRONLY | O_CREATE, 0o600)
        .unwrap();
    file.close().unwrap();

    // umask may only clear bits
    let meta = fs.stat(Path::new("secret")).unwrap();
    assert_eq!(meta.mode & !0o600, 0);
}

#[test]
fn open_file_read_only_create() {
    let (dir, fs) = sandbox();
    let mut file = fs
        .open_file(Path::new("new"), O_RDONLY | O_CREATE, 0o644)
        .unwrap();
    let mut buf = String::new();
    file.read_to_string(&mut buf).unwrap();
    file.close().unwrap();

    assert!(buf.is_empty());
    assert!(dir.path().join("new").is_file());
}

#[test]
fn open_missing_is_not_exist() {
    let (_dir, fs) = sandbox();
    let err = fs.open_file(Path::new("missing"), O_RDONLY, 0).unwrap_err();
    assert!(err.is_not_exist());
    assert!(fsx::is_not_exist(&err));
}

#[test]
fn mkdir_and_read_dir() {
    let (_dir, fs) = sandbox();

    fs.mkdir(Path::new("b"), 0o755).unwrap();
    fs.mkdir_all(Path::new("a/deep/tree"), 0o755).unwrap();
    write(&fs, "c.txt", "12345");

    let entries = fs.read_dir(Path::new(".")).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c.txt"]);
    assert_eq!(entries[0].metadata.file_type, FileType::Directory);
    assert_eq!(entries[2].metadata.file_type, FileType::File);
    assert_eq!(entries[2].metadata.size, 5);

    assert!(fs.stat(Path::new("a/deep/tree")).unwrap().file_type.is_dir());
}

#[test]
fn mkdir_existing_fails() {
    let (_dir, fs) = sandbox();
    fs.mkdir(Path::new("d"), 0o755).unwrap();
    assert!(fs.mkdir(Path::new("d"), 0o755).is_err());
    fs.mkdir_all(Path::new("d"), 0o755).unwrap();
}

#[test]
fn chmod_changes_permissions() {
    let (_dir, fs) = sandbox();
    write(&fs, "f", "x");

    fs.chmod(Path::new("f"), 0o640).unwrap();
    assert_eq!(fs.stat(Path::new("f")).unwrap().mode, 0o640);
}

#[test]
fn chown_to_self() {
    let (_dir, fs) = sandbox();
    write(&fs, "f", "x");

    let meta = fs.stat(Path::new("f")).unwrap();
    fs.chown(Path::new("f"), meta.uid, meta.gid).unwrap();
}

#[test]
fn chtimes_sets_modification_time() {
    let (_dir, fs) = sandbox();
    write(&fs, "f", "x");

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    fs.chtimes(Path::new("f"), when, when).unwrap();

    let meta = fs.stat(Path::new("f")).unwrap();
    assert_eq!(meta.modified, when);
    assert_eq!(meta.accessed, when);
}

#[test]
fn chtimes_on_socket() {
    let (_dir, fs) = sandbox();
    let _listener = fs.listen_unix(Path::new("app.sock")).unwrap();

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
    fs.chtimes(Path::new("app.sock"), when, when).unwrap();

    assert_eq!(fs.stat(Path::new("app.sock")).unwrap().modified, when);
}

#[test]
fn chtimes_on_unreadable_file() {
    let (_dir, fs) = sandbox();
    write(&fs, "locked", "x");
    fs.chmod(Path::new("locked"), 0o200).unwrap();

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_200_000_000);
    fs.chtimes(Path::new("locked"), when, when).unwrap();

    assert_eq!(fs.stat(Path::new("locked")).unwrap().modified, when);
}

#[test]
fn lstat_does_not_follow_links() {
    let (dir, fs) = sandbox();
    write(&fs, "target", "x");
    std::os::unix::fs::symlink("target", dir.path().join("link")).unwrap();

    assert!(fs.lstat(Path::new("link")).unwrap().file_type.is_symlink());
    assert!(fs.stat(Path::new("link")).unwrap().file_type.is_file());
}

#[test]
fn rename_inside_sandbox() {
    let (_dir, fs) = sandbox();
    write(&fs, "old", "content");
    fs.mkdir(Path::new("sub"), 0o755).unwrap();

    fs.rename(Path::new("old"), Path::new("sub/new")).unwrap();

    assert!(fs.stat(Path::new("old")).unwrap_err().is_not_exist());
    assert_eq!(read(&fs, "sub/new"), "content");
}

#[test]
fn remove_file_and_empty_dir() {
    let (_dir, fs) = sandbox();
    write(&fs, "f", "x");
    fs.mkdir(Path::new("d"), 0o755).unwrap();

    fs.remove(Path::new("f")).unwrap();
    fs.remove(Path::new("d")).unwrap();

    assert!(fs.stat(Path::new("f")).unwrap_err().is_not_exist());
    assert!(fs.stat(Path::new("d")).unwrap_err().is_not_exist());
    assert!(fs.remove(Path::new("f")).unwrap_err().is_not_exist());
}

#[test]
fn remove_non_empty_dir_fails() {
    let (_dir, fs) = sandbox();
    fs.mkdir_all(Path::new("d/e"), 0o755).unwrap();
    assert!(fs.remove(Path::new("d")).is_err());
}

#[test]
fn remove_all_tree_and_missing() {
    let (_dir, fs) = sandbox();
    fs.mkdir_all(Path::new("d/e/f"), 0o755).unwrap();
    write(&fs, "d/e/f/file", "x");

    fs.remove_all(Path::new("d")).unwrap();
    assert!(fs.stat(Path::new("d")).unwrap_err().is_not_exist());

    fs.remove_all(Path::new("never-existed")).unwrap();
}

#[test]
fn unix_socket_listen_and_dial() {
    let (dir, fs) = sandbox();

    let listener = fs.listen_unix(Path::new("app.sock")).unwrap();
    assert!(dir.path().join("app.sock").exists());
    assert!(fs.stat(Path::new("app.sock")).unwrap().file_type.is_socket());

    let mut client = fs.dial_unix(Path::new("app.sock")).unwrap();
    let (mut server, _) = listener.accept().unwrap();

    client.write_all(b"ping").unwrap();
    let mut buf = [0u8; 4];
    server.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"ping");
}

#[test]
fn socket_paths_outside_sandbox_rejected() {
    let (_dir, fs) = sandbox();
    assert!(fs.listen_unix(Path::new("/tmp/evil.sock")).unwrap_err().is_not_exist());
    assert!(fs.dial_unix(Path::new("../evil.sock")).unwrap_err().is_not_exist());
}

#[test]
fn escape_attempts_leave_host_untouched() {
    let parent = tempfile::tempdir().unwrap();
    std::fs::create_dir(parent.path().join("jail")).unwrap();
    std::fs::write(parent.path().join("outside.txt"), "keep").unwrap();

    let fs = ContainedFs::new(OsFs::shared(), parent.path().join("jail"));

    assert!(fs.remove(Path::new("../outside.txt")).unwrap_err().is_not_exist());
    assert!(fs.remove_all(Path::new("..")).unwrap_err().is_not_exist());
    assert!(fs.create(Path::new("../new.txt")).unwrap_err().is_not_exist());
    assert!(
        fs.rename(Path::new("../outside.txt"), Path::new("stolen.txt"))
            .unwrap_err()
            .is_not_exist()
    );

    assert_eq!(
        std::fs::read_to_string(parent.path().join("outside.txt")).unwrap(),
        "keep"
    );
    assert!(!parent.path().join("new.txt").exists());
}

#[test]
fn chdir_over_os_reaches_parent() {
    let parent = tempfile::tempdir().unwrap();
    std::fs::create_dir(parent.path().join("work")).unwrap();
    std::fs::write(parent.path().join("shared.txt"), "shared").unwrap();

    let fs = ChdirFs::new(OsFs::shared(), parent.path().join("work"));
    assert_eq!(read(&fs, "../shared.txt"), "shared");
}

#[test]
fn absolute_base_dir_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let base = BaseDir::absolute(dir.path()).unwrap();
    assert_eq!(base.as_path(), dir.path());

    let fs = ContainedFs::with_base_dir(OsFs::shared(), base);
    write(&fs, "x", "y");
    assert_eq!(read(&fs, "x"), "y");
}
