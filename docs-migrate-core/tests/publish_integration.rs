mod common;

use common::{function_page, markdown_page, typedef_page, RecordingStore};
use docs_migrate_core::config::RunConfig;
use docs_migrate_core::contract::{Collection, MockDocumentStore, WriteOp};
use docs_migrate_core::error::MigrateError;
use docs_migrate_core::model::{StoredPackage, Submodule, Version, VersionPreview};
use docs_migrate_core::publish::publish_version;
use docs_migrate_core::source::VersionData;
use serde_json::{json, Value};

fn existing_package() -> StoredPackage {
    StoredPackage {
        id: "pkg-1".to_string(),
        name: "date-fns".to_string(),
        versions: vec![json!({
            "version": "v2.0.0",
            "preRelease": false,
            "createdAt": 1,
            "submodules": ["default", "fp"],
        })],
    }
}

fn package_update_versions(store: &RecordingStore) -> Vec<Value> {
    store
        .groups()
        .iter()
        .flat_map(|g| g.ops.iter())
        .find_map(|op| match op {
            WriteOp::Update {
                collection: Collection::Packages,
                fields,
                ..
            } => fields["versions"].as_array().cloned(),
            _ => None,
        })
        .expect("The package preview list is updated")
}

fn version_data(pages: Vec<Value>) -> VersionData {
    VersionData {
        tag: "v2.1.0".to_string(),
        date: 1_600_000_000_000,
        prerelease: true,
        commit: "abc123".to_string(),
        docs_categories: vec!["General".to_string(), "Common Helpers".to_string()],
        docs_pages: pages,
    }
}

fn many_pages(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| function_page(&format!("fn{i}"), &format!("fn{i}"), false))
        .collect()
}

#[tokio::test]
async fn test_publish_appends_version_and_preview() {
    let store = RecordingStore::new().with_package(existing_package());
    let data = version_data(vec![
        markdown_page("Getting Started", "Getting Started"),
        function_page("fp/addDays", "addDays", true),
        function_page("addDays", "addDays", false),
        typedef_page("Interval", "Interval"),
    ]);

    let report = publish_version(&RunConfig::default(), &store, data)
        .await
        .expect("Publish should succeed");
    assert_eq!(report.package_id, "pkg-1");
    assert_eq!(report.pages, 4);
    assert_eq!(report.groups, 1);

    let groups = store.groups();
    assert_eq!(groups.len(), 1);
    let update = groups[0]
        .ops
        .iter()
        .find_map(|op| match op {
            WriteOp::Update {
                collection: Collection::Packages,
                id,
                fields,
            } => Some((id.clone(), fields.clone())),
            _ => None,
        })
        .expect("The first group updates the package");
    assert_eq!(update.0, "pkg-1");
    let previews: Vec<VersionPreview> =
        serde_json::from_value(update.1["versions"].clone()).unwrap();
    let tags: Vec<&str> = previews.iter().map(|p| p.version.as_str()).collect();
    assert_eq!(tags, vec!["v2.0.0", "v2.1.0"]);
    assert!(previews[1].pre_release);
    assert_eq!(previews[1].submodules, vec![Submodule::Default, Submodule::FP]);

    let version: Version =
        serde_json::from_value(store.documents(Collection::Versions)[0].clone()).unwrap();
    assert_eq!(version.submodules, vec![Submodule::Default, Submodule::FP]);
    let subs: Vec<(&str, &Vec<Submodule>)> = version
        .pages
        .iter()
        .map(|p| (p.slug.as_str(), &p.submodules))
        .collect();
    assert_eq!(
        subs,
        vec![
            ("Getting-Started", &vec![Submodule::Default, Submodule::FP]),
            ("addDays", &vec![Submodule::FP]),
            ("addDays", &vec![Submodule::Default]),
            ("Interval", &vec![Submodule::Default, Submodule::FP]),
        ]
    );

    let pages = store.documents(Collection::Pages);
    assert_eq!(pages[1]["type"], json!("jsdoc"));
    assert_eq!(pages[0]["type"], json!("markdown"));
    assert_eq!(pages[0]["markdown"], json!("# Getting Started"));
}

#[tokio::test]
async fn test_publish_keeps_existing_previews_untouched() {
    let legacy = json!({ "version": "v1.0.0", "preRelease": false, "createdAt": 1 });
    let annotated = json!({
        "version": "v1.30.0",
        "preRelease": false,
        "createdAt": 2,
        "submodules": ["default"],
        "note": "hand-edited",
    });
    let store = RecordingStore::new().with_package(StoredPackage {
        id: "pkg-1".to_string(),
        name: "date-fns".to_string(),
        versions: vec![legacy.clone(), annotated.clone()],
    });

    publish_version(
        &RunConfig::default(),
        &store,
        version_data(vec![markdown_page("Intro", "Intro")]),
    )
    .await
    .expect("Publish should succeed");

    let versions = package_update_versions(&store);
    assert_eq!(versions.len(), 3);
    assert_eq!(versions[0], legacy);
    assert_eq!(versions[1], annotated);
    assert_eq!(versions[2]["version"], json!("v2.1.0"));
    assert_eq!(versions[2]["submodules"], json!(["default", "fp"]));
}

#[tokio::test]
async fn test_publish_rejects_out_of_range_group_size_before_lookup() {
    let mut store = MockDocumentStore::new();
    store.expect_find_package().never();
    store.expect_commit().never();

    let config = RunConfig {
        max_pages_per_group: 0,
        ..RunConfig::default()
    };
    let err = publish_version(&config, &store, version_data(vec![markdown_page("Intro", "Intro")]))
        .await
        .expect_err("A zero group size is rejected");

    assert!(matches!(err, MigrateError::InvalidGroupSize(0)));
}

#[tokio::test]
async fn test_publish_splits_250_pages_into_two_groups() {
    let store = RecordingStore::new().with_package(existing_package());

    let report = publish_version(&RunConfig::default(), &store, version_data(many_pages(250)))
        .await
        .expect("Publish should succeed");
    assert_eq!(report.groups, 2);

    let groups = store.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 202, "Version, package update and 200 pages");
    assert_eq!(groups[0].ops[0].collection(), Collection::Versions);
    assert_eq!(groups[0].ops[1].collection(), Collection::Packages);
    assert!(groups[0].ops[2..]
        .iter()
        .all(|op| op.collection() == Collection::Pages));
    assert_eq!(groups[1].len(), 50);
    assert!(groups[1].ops.iter().all(|op| op.collection() == Collection::Pages));

    let titles: Vec<String> = store
        .documents(Collection::Pages)
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles[199], "fn199");
    assert_eq!(titles[200], "fn200");
}

#[tokio::test]
async fn test_publish_second_group_failure_keeps_first_group() {
    let store = RecordingStore::failing_on(2).with_package(existing_package());

    let err = publish_version(&RunConfig::default(), &store, version_data(many_pages(250)))
        .await
        .expect_err("Second group is rejected");

    match err {
        MigrateError::WriteGroup {
            version,
            group,
            groups,
            committed,
            ..
        } => {
            assert_eq!(version, "v2.1.0");
            assert_eq!((group, groups, committed), (2, 2, 1));
        }
        other => panic!("Unexpected error: {other:?}"),
    }

    assert_eq!(store.documents(Collection::Versions).len(), 1);
    assert_eq!(store.documents(Collection::Pages).len(), 200);
}

#[tokio::test]
async fn test_publish_respects_configured_group_size() {
    let store = RecordingStore::new().with_package(existing_package());
    let config = RunConfig {
        max_pages_per_group: 2,
        ..RunConfig::default()
    };

    let report = publish_version(&config, &store, version_data(many_pages(5)))
        .await
        .expect("Publish should succeed");

    assert_eq!(report.groups, 3);
    let sizes: Vec<usize> = store.groups().iter().map(|g| g.len()).collect();
    assert_eq!(sizes, vec![4, 2, 1]);
}

#[tokio::test]
async fn test_publish_without_package_writes_nothing() {
    let mut store = MockDocumentStore::new();
    store.expect_find_package().times(1).returning(|_| Ok(None));
    store.expect_commit().never();
    store.expect_new_id().never();

    let err = publish_version(
        &RunConfig::default(),
        &store,
        version_data(vec![markdown_page("Intro", "Intro")]),
    )
    .await
    .expect_err("A missing package is fatal");

    assert!(matches!(err, MigrateError::MissingPackage(ref name) if name == "date-fns"));
    assert_eq!(err.to_string(), "Could not find date-fns package in storage");
}

#[tokio::test]
async fn test_publish_rejects_unknown_page_type_before_lookup() {
    let mut store = MockDocumentStore::new();
    store.expect_find_package().never();
    store.expect_commit().never();

    let err = publish_version(
        &RunConfig::default(),
        &store,
        version_data(vec![json!({ "type": "html", "urlId": "x" })]),
    )
    .await
    .expect_err("Unknown page types are fatal");

    assert_eq!(err.to_string(), "Unknown page type html");
}
