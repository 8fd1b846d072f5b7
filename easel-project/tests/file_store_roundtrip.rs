use std::time::Duration;

use easel_history::{SavePayload, SaveSink};
use easel_project::{
    Autosave, AutosaveConfig, FileProjectStore, ManualClock, ProjectError, ProjectRecord,
    ProjectStore,
};

#[test]
fn file_store_roundtrip() {
    let mut store = FileProjectStore::new("target/test_projects");
    let record = ProjectRecord::new("flyer", 800.0, 600.0).unwrap();
    store.create_project(&record).unwrap();

    let loaded = store.load_project(record.id).unwrap();
    assert_eq!(loaded, record);

    let payload = SavePayload {
        json: "{\"version\":\"1\",\"objects\":[]}".into(),
        width: 1024.0,
        height: 768.0,
    };
    store.update_project(record.id, &payload).unwrap();

    let updated = store.load_project(record.id).unwrap();
    assert_eq!(updated.json, payload.json);
    assert_eq!((updated.width, updated.height), (1024.0, 768.0));
    assert_eq!(updated.name, "flyer");
}

#[test]
fn missing_project_is_not_found() {
    let store = FileProjectStore::new("target/test_projects");
    let err = store.load_project(uuid::Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProjectError>(),
        Some(ProjectError::NotFound { .. })
    ));
}

#[test]
fn autosave_writes_through_to_disk() {
    let mut store = FileProjectStore::new("target/test_projects");
    let record = ProjectRecord::new("banner", 1500.0, 500.0).unwrap();
    store.create_project(&record).unwrap();

    let clock = ManualClock::new();
    let mut autosave = Autosave::new(record.id, store, clock.clone(), &AutosaveConfig::default());

    for n in 0..3 {
        autosave.save(SavePayload {
            json: format!("{{\"n\":{n}}}"),
            width: 1500.0,
            height: 500.0,
        });
        clock.advance(Duration::from_millis(30));
    }
    clock.advance(Duration::from_millis(500));
    assert!(autosave.poll().unwrap());

    let saved = autosave.store().load_project(record.id).unwrap();
    assert_eq!(saved.json, "{\"n\":2}");
}
