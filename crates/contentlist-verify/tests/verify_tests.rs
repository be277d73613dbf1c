use std::fs::{self, OpenOptions};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use contentlist_codec::{EntryReader, EntryWriter};
use contentlist_core::{CancelToken, ContentPath, CreateConfig, Entry, WriterConfig};
use contentlist_scan::Creator;
use contentlist_verify::{
    Check, EntryValidator, Outcome, TreeValidator, ValidateEntry, validate_manifest,
};
use contentlist_vfs::VirtualFileSystem;
use tempfile::TempDir;

fn create(inputs: &[PathBuf], config: CreateConfig) -> Vec<Entry> {
    let creator = Creator::new(config, CancelToken::new());
    let mut entries: Vec<Entry> = Vec::new();
    creator.create(inputs, &mut entries).unwrap();
    entries
}

fn entry<'a>(entries: &'a [Entry], path: &str) -> &'a Entry {
    entries
        .iter()
        .find(|e| e.path().to_string() == path)
        .unwrap()
}

fn overwrite_byte(path: &Path, offset: u64, byte: u8) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(&[byte]).unwrap();
}

fn validator(base: &Path) -> EntryValidator {
    EntryValidator::new(base, CancelToken::new()).unwrap()
}

#[test]
fn test_scenario_validate_then_delete() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("D");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("a.txt"), "abcd").unwrap();

    let entries = create(
        &[dir.join("a.txt"), dir.join("sub")],
        CreateConfig::default(),
    );
    let validator = validator(&dir);

    for path in ["/a.txt", "/sub"] {
        let outcome = validator.validate(entry(&entries, path), &mut ()).unwrap();
        assert_eq!(outcome, Outcome::Success, "{path}");
    }

    fs::remove_file(dir.join("a.txt")).unwrap();
    let outcome = validator
        .validate(entry(&entries, "/a.txt"), &mut ())
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Existence {
            expected: true,
            found: false
        }
    );
}

#[test]
fn test_creator_validator_consistency() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("small.txt"), "hi").unwrap();
    fs::write(root.join("empty.bin"), "").unwrap();
    let big: Vec<u8> = (0..3_000_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(root.join("nested/big.bin"), &big).unwrap();
    fs::write(root.join("nested/deeper/leaf"), "leaf").unwrap();

    for config in [
        CreateConfig::default(),
        CreateConfig::builder().sample_size(0usize).build().unwrap(),
        CreateConfig::builder().compute_hash(false).build().unwrap(),
    ] {
        let entries = create(&[root.clone()], config);
        let vfs = VirtualFileSystem::from_entries(entries.clone());
        let validator = TreeValidator::new(&vfs, temp.path(), CancelToken::new()).unwrap();
        let summary = validator
            .validate(&ContentPath::absolute_root(), &mut ())
            .unwrap();

        assert_eq!(summary.validated, entries.len() as u64);
        assert!(summary.all_passed(), "{:?}", summary.failures);
        assert_eq!(summary.skipped, 0);
    }
}

#[test]
fn test_tampering_detection() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("t");
    fs::create_dir(&root).unwrap();
    let content: Vec<u8> = (0..100u8).collect();
    for name in ["sampled", "hashed", "truncated", "grown"] {
        fs::write(root.join(name), &content).unwrap();
    }

    let sampled = create(&[root.clone()], CreateConfig::default());
    let unsampled = create(
        &[root.clone()],
        CreateConfig::builder().sample_size(0usize).build().unwrap(),
    );

    overwrite_byte(&root.join("sampled"), 3, 0xff);
    overwrite_byte(&root.join("hashed"), 50, 0xff);
    OpenOptions::new()
        .write(true)
        .open(root.join("truncated"))
        .unwrap()
        .set_len(99)
        .unwrap();
    OpenOptions::new()
        .append(true)
        .open(root.join("grown"))
        .unwrap()
        .write_all(b"!")
        .unwrap();

    let validator = validator(temp.path());
    let check_of = |entries: &[Entry], path: &str| {
        validator
            .validate(entry(entries, path), &mut ())
            .unwrap()
            .check()
    };

    assert_eq!(check_of(&sampled, "/t/sampled"), Some(Check::Sample));
    assert_eq!(check_of(&unsampled, "/t/hashed"), Some(Check::Hash));
    assert_eq!(check_of(&sampled, "/t/hashed"), Some(Check::Hash));
    assert_eq!(check_of(&sampled, "/t/truncated"), Some(Check::Size));
    assert_eq!(check_of(&sampled, "/t/grown"), Some(Check::Size));

    match validator
        .validate(entry(&sampled, "/t/sampled"), &mut ())
        .unwrap()
    {
        Outcome::Sample { expected, found } => {
            assert_eq!(expected[3], 3);
            assert_eq!(found[3], 0xff);
            assert_eq!(found.len(), 24);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn test_validate_manifest_stream() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("m");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("one"), "1").unwrap();
    fs::write(root.join("two"), "22").unwrap();

    let mut writer = EntryWriter::new(Vec::new(), WriterConfig::all());
    for entry in create(&[root.clone()], CreateConfig::default()) {
        writer.write_entry(&entry).unwrap();
    }
    let bytes = writer.into_inner().unwrap();

    let summary = validate_manifest(
        EntryReader::new(Cursor::new(bytes.clone())),
        temp.path(),
        &mut (),
        CancelToken::new(),
    )
    .unwrap();
    assert_eq!(summary.validated, 4);
    assert!(summary.all_passed());

    fs::write(root.join("two"), "2").unwrap();
    let summary = validate_manifest(
        EntryReader::new(Cursor::new(bytes)),
        temp.path(),
        &mut (),
        CancelToken::new(),
    )
    .unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].path.to_string(), "/m/two");
    assert_eq!(summary.failures[0].outcome.check(), Some(Check::Size));
}

#[test]
fn test_tree_validation_skips_missing_directory_contents() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("r");
    fs::create_dir_all(root.join("gone")).unwrap();
    fs::write(root.join("gone/a"), "a").unwrap();
    fs::write(root.join("gone/b"), "b").unwrap();
    fs::write(root.join("kept"), "k").unwrap();

    let entries = create(&[root.clone()], CreateConfig::default());
    fs::remove_dir_all(root.join("gone")).unwrap();

    let vfs = VirtualFileSystem::from_entries(entries);
    let validator = TreeValidator::new(&vfs, temp.path(), CancelToken::new()).unwrap();
    let summary = validator
        .validate(&ContentPath::parse("/r").unwrap(), &mut ())
        .unwrap();

    // /r, /r/gone and /r/kept; the children of /r/gone are not visited.
    assert_eq!(summary.validated, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].path.to_string(), "/r/gone");
}
