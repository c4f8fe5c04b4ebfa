//! End-to-end migration scenarios against a temporary albums root and
//! on-disk library

mod common;

use common::{FaultyLibrary, FaultyStore, Fixture, album_assets, blob_count, path_set, read};
use photos_migrator::error::{Error, FileSystemError, LibraryError, LogicError};
use photos_migrator::library::{AlbumFilter, AuthorizationStatus, ChangeBatch};
use photos_migrator::migrate::{
    ExportOutcome, ExportStatus, ImportStatus, Job, JobOutcome, MigrationEvent, MigrationWorker, Stage,
    export_folder, import_folder, resolve_or_create,
};
use photos_migrator::{FileCatalog, FolderState, LocalLibrary, PhotoLibrary};
use std::fs;
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

const TRIP: &[(&str, &[u8])] = &[
    ("a.jpg", b"first photo"),
    ("b.jpg", b"second photo"),
    ("c.jpg", b"third photo"),
];

#[test]
fn test_import_creates_album_and_empties_folder() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = fixture.library();

    let report = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    assert_eq!(report.status(), ImportStatus::Done);
    assert!(report.album_created);
    assert_eq!(report.imported, 3);
    assert!(report.progress.is_complete());
    assert!(fixture.file_names(&folder).is_empty());
    assert_eq!(
        album_assets(&library, "Trip"),
        Some(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()])
    );
}

#[test]
fn test_import_reuses_existing_album() {
    let fixture = Fixture::new();
    let mut library = fixture.library();
    let first = resolve_or_create(&mut library, "Trip").unwrap();
    let second = resolve_or_create(&mut library, "Trip").unwrap();
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);

    let folder = fixture.stage("Trip", &TRIP[..1]);
    let report = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    assert!(!report.album_created);
    assert_eq!(report.album, first.id);
    assert_eq!(library.find_albums(&AlbumFilter::All).unwrap().len(), 1);
}

#[test]
fn test_failed_file_stays_in_folder() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = FaultyLibrary::new(fixture.library()).rejecting_files(&["b.jpg"]);

    let report = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    assert_eq!(report.status(), ImportStatus::Partial);
    assert_eq!(report.imported, 2);
    assert_eq!(report.not_processed(), 1);
    assert_eq!(report.remaining[0].name, "b.jpg");
    assert_eq!(report.progress.completed, 2);

    // Every photo is in exactly one place
    assert_eq!(fixture.file_names(&folder), vec!["b.jpg"]);
    assert_eq!(
        album_assets(&library, "Trip"),
        Some(vec!["a.jpg".into(), "c.jpg".into()])
    );
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_counts_as_not_processed() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", &TRIP[..2]);
    let garbled = folder.path.join(OsStr::from_bytes(b"c\xff.jpg"));
    fs::write(&garbled, b"third photo").unwrap();
    let mut library = fixture.library();

    let report = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    assert_eq!(report.status(), ImportStatus::Partial);
    assert_eq!(report.imported, 2);
    assert_eq!(report.unreadable, 1);
    assert!(report.remaining.is_empty());
    assert_eq!(report.not_processed(), 1);
    assert!(garbled.exists());
    assert_eq!(
        album_assets(&library, "Trip"),
        Some(vec!["a.jpg".into(), "b.jpg".into()])
    );
}

#[test]
fn test_undeletable_source_rolls_back_asset() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = fixture.library();
    let store = FaultyStore {
        undeletable: path_set(&["c.jpg"]),
        ..FaultyStore::default()
    };

    let report = import_folder(&mut library, &store, &folder, &mut ()).unwrap();

    assert_eq!(report.status(), ImportStatus::Partial);
    assert_eq!(fixture.file_names(&folder), vec!["c.jpg"]);
    assert_eq!(
        album_assets(&library, "Trip"),
        Some(vec!["a.jpg".into(), "b.jpg".into()])
    );
    assert_eq!(blob_count(&fixture), 2);
}

#[test]
fn test_album_creation_failure_aborts_import() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = FaultyLibrary::new(fixture.library());
    library.reject_album_creation = true;

    let err = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap_err();

    assert!(matches!(
        err,
        Error::Logic(LogicError::AlbumCreationFailed { ref title, .. }) if title == "Trip"
    ));
    assert_eq!(fixture.file_names(&folder).len(), 3);
    assert!(library.find_albums(&AlbumFilter::All).unwrap().is_empty());
}

#[test]
fn test_import_requires_authorization() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = LocalLibrary::open(&fixture.config.library_dir, &fixture.config).unwrap();
    library.set_authorization(AuthorizationStatus::Denied).unwrap();

    let err = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap_err();
    assert!(matches!(err, Error::Library(LibraryError::AuthorizationDenied)));
    assert_eq!(fixture.file_names(&folder).len(), 3);
}

#[test]
fn test_import_asks_for_access_once() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", &TRIP[..1]);
    let mut library = LocalLibrary::open(&fixture.config.library_dir, &fixture.config).unwrap();
    assert_eq!(library.authorization_status(), AuthorizationStatus::NotDetermined);

    import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    assert_eq!(library.authorization_status(), AuthorizationStatus::Authorized);
}

#[test]
fn test_import_of_empty_folder_is_refused() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Empty", &[]);
    let mut library = fixture.library();

    let err = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap_err();
    assert!(matches!(err, Error::Logic(LogicError::EmptyFolder { .. })));
    assert!(library.find_albums(&AlbumFilter::All).unwrap().is_empty());
}

#[test]
fn test_export_missing_album_touches_nothing() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Beach", &[]);
    let mut library = fixture.library();
    let trip = fixture.stage("Trip", TRIP);
    import_folder(&mut library, &fixture.store, &trip, &mut ()).unwrap();

    let outcome = export_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::NotFound {
            title: "Beach".into()
        }
    );
    assert!(fixture.file_names(&folder).is_empty());
    assert_eq!(album_assets(&library, "Trip").map(|a| a.len()), Some(3));
}

#[test]
fn test_round_trip_restores_files() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let taken = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
    filetime::set_file_mtime(
        folder.path.join("a.jpg"),
        filetime::FileTime::from_system_time(taken),
    )
    .unwrap();
    let mut library = fixture.library();

    import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    let state = FileCatalog::new(&fixture.store, &folder.path).state().unwrap();
    assert_eq!(state, FolderState::Empty);
    assert!(state.can_export());

    let outcome = export_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    let ExportOutcome::Exported(report) = outcome else {
        panic!("album should exist");
    };

    assert_eq!(report.status(), ExportStatus::Done);
    assert_eq!(report.exported, 3);
    assert_eq!(report.deleted.len(), 3);
    assert!(report.assets_deleted);
    assert_eq!(fixture.file_names(&folder), vec!["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(read(folder.path.join("b.jpg")), b"second photo");

    let modified = fs::metadata(folder.path.join("a.jpg")).unwrap().modified().unwrap();
    assert_eq!(modified, taken);

    // The album stays, emptied
    assert_eq!(album_assets(&library, "Trip"), Some(Vec::new()));
    assert_eq!(blob_count(&fixture), 0);
    assert!(!FileCatalog::new(&fixture.store, &folder.path).state().unwrap().can_export());
}

#[test]
fn test_export_deletes_every_fetched_asset() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let mut library = fixture.library();
    import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    // One name already taken, one write fails
    fs::write(folder.path.join("a.jpg"), b"already here").unwrap();
    let store = FaultyStore {
        unwritable: path_set(&["c.jpg"]),
        ..FaultyStore::default()
    };

    let outcome = export_folder(&mut library, &store, &folder, &mut ()).unwrap();
    let ExportOutcome::Exported(report) = outcome else {
        panic!("album should exist");
    };

    assert_eq!(report.exported, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.status(), ExportStatus::Partial { shortfall: 2 });
    assert_eq!(report.deleted.len(), 3);

    assert_eq!(read(folder.path.join("a.jpg")), b"already here");
    assert!(!folder.path.join("c.jpg").exists());
    assert_eq!(album_assets(&library, "Trip"), Some(Vec::new()));
}

#[test]
fn test_export_reports_failed_deletion() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", &TRIP[..2]);
    let mut library = FaultyLibrary::new(fixture.library());
    import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    library.reject_deletes = true;

    let ExportOutcome::Exported(report) =
        export_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap()
    else {
        panic!("album should exist");
    };

    assert_eq!(report.status(), ExportStatus::Done);
    assert!(!report.assets_deleted);
    assert_eq!(album_assets(&library, "Trip").map(|a| a.len()), Some(2));
}

#[test]
fn test_export_ignores_albums_inside_collections() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", &TRIP[..1]);
    let mut library = fixture.library();
    let report = import_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();

    let mut batch = ChangeBatch::new();
    let holidays = batch.create_collection("Holidays");
    let holidays = library.perform_changes(batch).unwrap().collection(holidays).unwrap();
    let mut batch = ChangeBatch::new();
    batch.insert_albums(&holidays, [report.album]);
    library.perform_changes(batch).unwrap();

    let outcome = export_folder(&mut library, &fixture.store, &folder, &mut ()).unwrap();
    assert!(matches!(outcome, ExportOutcome::NotFound { .. }));
}

#[test]
fn test_duplicate_folder_is_rejected() {
    let fixture = Fixture::new();
    let folders = fixture.folders();
    folders.create("Trip").unwrap();

    let err = folders.create("Trip").unwrap_err();
    assert!(matches!(err, FileSystemError::AlreadyExists { .. }));
    assert_eq!(folders.list().unwrap().len(), 1);
}

#[test]
fn test_worker_reports_progress_and_result() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let (worker, events) = MigrationWorker::spawn(fixture.library(), fixture.store).unwrap();

    worker.submit(Job::Import(folder.clone())).unwrap();

    let mut stages = Vec::new();
    let mut progress = Vec::new();
    let outcome = loop {
        match events.recv_timeout(Duration::from_secs(30)).unwrap() {
            MigrationEvent::Started { folder: started } => assert_eq!(started, folder.path),
            MigrationEvent::Stage { stage, .. } => stages.push(stage),
            MigrationEvent::Progress { progress: p, .. } => progress.push(p.completed),
            MigrationEvent::Finished { result, .. } => break result.unwrap(),
        }
    };
    worker.shutdown();

    assert_eq!(
        stages,
        vec![Stage::ResolvingAlbum, Stage::Transferring, Stage::Finalizing]
    );
    assert_eq!(progress, vec![0, 1, 2, 3]);
    let JobOutcome::Imported(report) = outcome else {
        panic!("import job should report an import");
    };
    assert_eq!(report.status(), ImportStatus::Done);
    assert!(fixture.file_names(&folder).is_empty());
}

#[test]
fn test_worker_rejects_second_job_for_busy_folder() {
    let fixture = Fixture::new();
    let folder = fixture.stage("Trip", TRIP);
    let (open_gate, gate) = mpsc::channel();
    let mut library = FaultyLibrary::new(fixture.library());
    library.gate = Some(gate);
    let (worker, events) = MigrationWorker::spawn(library, fixture.store).unwrap();

    worker.submit(Job::Import(folder.clone())).unwrap();
    assert!(worker.is_busy(&folder.path));
    let err = worker.submit(Job::Export(folder.clone())).unwrap_err();
    assert!(matches!(err, Error::Logic(LogicError::MigrationInProgress { .. })));

    drop(open_gate);
    let finished = events
        .iter()
        .find_map(|event| match event {
            MigrationEvent::Finished { result, .. } => Some(result),
            _ => None,
        })
        .unwrap();
    assert!(finished.is_ok());
    assert!(!worker.is_busy(&folder.path));
    worker.shutdown();
}
