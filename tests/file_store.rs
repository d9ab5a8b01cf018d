use blackduck_artifactory::model::{PropertyQuery, RepoPath};
use blackduck_artifactory::store::fs::FilePropertyStore;
use blackduck_artifactory::store::PropertyStore;
use std::collections::BTreeSet;
use std::fs;

fn path(raw: &str) -> RepoPath {
    raw.parse().unwrap()
}

#[test]
fn missing_file_is_an_empty_store() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = FilePropertyStore::new(temp_dir.path().join("nested/properties.json"));

    assert!(!store.has_property(&path("libs/a.jar"), "blackduck.forge").unwrap());
    assert_eq!(store.get_property(&path("libs/a.jar"), "blackduck.forge").unwrap(), None);
    // Deleting from an empty store must not create the file.
    store.delete_property(&path("libs/a.jar"), "blackduck.forge").unwrap();
    assert!(!store.data_file().exists());
}

#[test]
fn values_persist_across_instances() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_file = temp_dir.path().join("nested/properties.json");

    let store = FilePropertyStore::new(&data_file);
    store
        .set_property(&path("libs/com/acme/app.jar"), "blackduck.projectName", "app")
        .unwrap();
    drop(store);

    let reopened = FilePropertyStore::new(&data_file);
    assert_eq!(
        reopened
            .get_property(&path("libs/com/acme/app.jar"), "blackduck.projectName")
            .unwrap()
            .as_deref(),
        Some("app")
    );

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&data_file).unwrap()).unwrap();
    assert_eq!(
        document["libs/com/acme/app.jar"]["blackduck.projectName"],
        "app"
    );
}

#[test]
fn no_temporary_files_are_left_behind() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = FilePropertyStore::new(temp_dir.path().join("properties.json"));

    for i in 0..5 {
        store
            .set_property(&path("libs/a.jar"), "blackduck.scanResult", &i.to_string())
            .unwrap();
    }

    let entries: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("properties.json")]);
}

#[test]
fn deleting_last_property_drops_the_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = FilePropertyStore::new(temp_dir.path().join("properties.json"));
    store.set_property(&path("libs/a.jar"), "blackduck.forge", "maven").unwrap();

    store.delete_property(&path("libs/a.jar"), "blackduck.forge").unwrap();

    let content = fs::read_to_string(store.data_file()).unwrap();
    assert!(!content.contains("libs/a.jar"));
}

#[test]
fn query_is_a_union_scoped_to_repositories() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = FilePropertyStore::new(temp_dir.path().join("properties.json"));
    store.set_property(&path("libs/a.jar"), "blackduck.forge", "maven").unwrap();
    store.set_property(&path("libs/b.tgz"), "blackduck.forge", "npmjs").unwrap();
    store.set_property(&path("libs/c.jar"), "blackduck.originId", "c:1").unwrap();
    store.set_property(&path("libs/d.txt"), "other", "x").unwrap();
    store.set_property(&path("remote/e.jar"), "blackduck.forge", "maven").unwrap();

    let mut query = PropertyQuery::new();
    query.insert("blackduck.forge".into(), BTreeSet::from(["mav?n".to_string()]));
    query.insert("blackduck.originId".into(), BTreeSet::from(["*".to_string()]));

    let found = store.items_by_properties(&query, &["libs"]).unwrap();
    assert_eq!(found, vec![path("libs/a.jar"), path("libs/c.jar")]);

    let found = store.items_by_properties(&query, &["libs", "remote"]).unwrap();
    assert_eq!(found.len(), 3);

    assert!(store
        .items_by_properties(&PropertyQuery::new(), &["libs"])
        .unwrap()
        .is_empty());
}

#[test]
fn corrupt_document_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_file = temp_dir.path().join("properties.json");
    fs::write(&data_file, "{ not json").unwrap();
    let store = FilePropertyStore::new(&data_file);

    assert!(store.get_property(&path("libs/a.jar"), "blackduck.forge").is_err());
}
