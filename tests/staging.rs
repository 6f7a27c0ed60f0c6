mod common;

use common::{file, RecordingSurface};
use forensight::{
    config::Config,
    dashboard::Dashboard,
    staging::{guess_mime, FileStaging, StagedFile, DEFAULT_ACTION_LABEL},
};
use std::io::Write;

#[test]
fn duplicate_name_and_size_is_ignored() {
    let mut staging = FileStaging::new();
    assert_eq!(staging.add_files([file("photo.jpg", 10)]), 1);
    assert_eq!(staging.add_files([file("photo.jpg", 10)]), 0);
    assert_eq!(staging.len(), 1);

    assert_eq!(staging.add_files([file("photo.jpg", 11)]), 1);
    assert_eq!(staging.add_files([file("photo2.jpg", 10)]), 1);
    assert_eq!(staging.len(), 3);
}

#[test]
fn duplicates_within_one_batch_are_collapsed() {
    let mut staging = FileStaging::new();
    let added = staging.add_files([file("a.pdf", 5), file("a.pdf", 5), file("b.pdf", 5)]);
    assert_eq!(added, 2);
    let names: Vec<_> = staging.files().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a.pdf", "b.pdf"]);
}

#[test]
fn remove_out_of_range_is_a_noop() {
    let mut staging = FileStaging::new();
    staging.add_files([file("a.txt", 1), file("b.txt", 2)]);
    assert!(staging.remove_file(5).is_none());
    assert_eq!(staging.len(), 2);

    let removed = staging.remove_file(0).expect("in range");
    assert_eq!(removed.name, "a.txt");
    assert_eq!(staging.files()[0].name, "b.txt");
}

#[test]
fn action_label_is_count_aware() {
    let mut staging = FileStaging::new();
    let idle = staging.action_state();
    assert!(!idle.enabled);
    assert_eq!(idle.label, DEFAULT_ACTION_LABEL);

    staging.add_files([file("a.txt", 1)]);
    assert_eq!(staging.action_state().label, "Analyze 1 file");

    staging.add_files([file("b.txt", 1), file("c.txt", 1)]);
    let state = staging.action_state();
    assert!(state.enabled);
    assert_eq!(state.label, "Analyze 3 files");
}

#[test]
fn every_mutation_repaints_with_matching_count_and_action() {
    let cfg = Config::default();
    let transport = common::FakeTransport::new();
    let mut dash = Dashboard::new(&cfg, &transport, RecordingSurface::default());

    dash.add_files([file("a.png", 1), file("b.png", 2)]);
    dash.add_files([file("a.png", 1)]);
    dash.remove_file(0);
    dash.remove_file(9);
    dash.add_files([file("c.mp4", 3)]);
    dash.clear_files();

    let surface = dash.into_surface();
    let counts: Vec<usize> = surface.staged.iter().map(|(n, _)| *n).collect();
    assert_eq!(counts, [0, 2, 2, 1, 1, 2, 0]);
    for (count, action) in &surface.staged {
        assert_eq!(action.enabled, *count > 0, "count={count} action={action:?}");
    }
}

#[test]
fn from_path_reads_size_and_guesses_mime() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Chat Log.PDF");
    let mut f = std::fs::File::create(&path).expect("create");
    f.write_all(b"%PDF-1.7 evidence").expect("write");

    let staged = StagedFile::from_path(&path).expect("stat");
    assert_eq!(staged.name, "Chat Log.PDF");
    assert_eq!(staged.size, 17);
    assert_eq!(staged.mime_type, "application/pdf");
    assert_eq!(guess_mime("clip.mkv"), "video/x-matroska");
    assert_eq!(guess_mime("archive.zip"), "application/octet-stream");
    assert_eq!(guess_mime("README"), "application/octet-stream");
}
