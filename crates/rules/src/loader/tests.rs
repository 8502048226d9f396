//! Tests for the rule loader module.

use std::fs;

use notify::event::{CreateKind, MetadataKind, ModifyKind};
use notify::{Event, EventKind};
use tempfile::TempDir;

use super::watcher::handle_fs_event;
use super::*;
use crate::catalog::{CatalogHandle, CatalogOptions};
use crate::checks::CheckRegistry;
use crate::schema::RuleKind;

const RULE_SET_YAML: &str = r#"
apiVersion: v1
kind: RuleSet
metadata:
  id: circularity
  name: Circularity
spec:
  rules:
    - code: CIRC-01
      category: circularity
      weight: 1
      explanation: definition repeats the term
      check: term_not_in_definition
"#;

const THRESHOLDS_YAML: &str = r#"
apiVersion: v1
kind: Thresholds
metadata:
  id: thresholds
  name: Thresholds
spec:
  overall: 0.75
  categories:
    grammar: { weight: 1 }
    circularity: { weight: 3, minimum: 0.75 }
    structure: { weight: 2 }
    coherence: { weight: 1 }
    integrity: { weight: 1 }
"#;

fn temp_loader() -> (TempDir, RuleLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = RuleLoader::new(dir.path().to_path_buf());
    (dir, loader)
}

fn loaded_ids(loaded: &LoadedDocuments) -> Vec<&str> {
    loaded
        .results
        .iter()
        .filter_map(|r| match &r.status {
            LoadStatus::Loaded { document_id } => Some(document_id.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn load_rule_set_from_file() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("circularity.yml");
    fs::write(&path, RULE_SET_YAML).unwrap();

    let doc = loader.load_file(&path).unwrap();
    assert_eq!(doc.kind(), RuleKind::RuleSet);
    assert_eq!(doc.metadata().id, "circularity");
    let rules = &doc.as_rule_set().unwrap().spec.rules;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].code, "CIRC-01");
    assert_eq!(rules[0].priority, 0);
    assert!(rules[0].enabled);
    assert!(doc.as_thresholds().is_none());
}

#[test]
fn load_thresholds_from_file() {
    let (dir, loader) = temp_loader();
    let path = dir.path().join("thresholds.yaml");
    fs::write(&path, THRESHOLDS_YAML).unwrap();

    let doc = loader.load_file(&path).unwrap();
    assert_eq!(doc.kind(), RuleKind::Thresholds);
    let spec = &doc.as_thresholds().unwrap().spec;
    assert_eq!(spec.overall, 0.75);
    assert_eq!(spec.weight(definitie_core::Category::Circularity), 3.0);
    assert_eq!(spec.minimum(definitie_core::Category::Circularity), Some(0.75));
    assert_eq!(spec.minimum(definitie_core::Category::Grammar), None);
}

#[test]
fn load_all_skips_dotfiles_and_non_yaml() {
    let (dir, loader) = temp_loader();

    fs::write(dir.path().join("rules.yml"), RULE_SET_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), RULE_SET_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a rule").unwrap();

    let loaded = loader.load_all().unwrap();
    assert_eq!(loaded_ids(&loaded), ["circularity"]);
    assert_eq!(loaded.documents.len(), 1);

    let skipped = loaded
        .results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
        .count();
    assert_eq!(skipped, 2);
    assert_eq!(loaded.failures().count(), 0);
}

#[test]
fn load_all_recursive_in_path_order() {
    let (dir, loader) = temp_loader();

    fs::write(dir.path().join("thresholds.yml"), THRESHOLDS_YAML).unwrap();
    let sub = dir.path().join("categories");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("circularity.yml"), RULE_SET_YAML).unwrap();
    fs::write(
        sub.join("another.yml"),
        RULE_SET_YAML
            .replace("id: circularity", "id: another")
            .replace("CIRC-01", "CIRC-09"),
    )
    .unwrap();

    let loaded = loader.load_all().unwrap();
    assert_eq!(loaded_ids(&loaded), ["another", "circularity", "thresholds"]);

    let again = loader.load_all().unwrap();
    assert_eq!(loaded_ids(&again), loaded_ids(&loaded));
}

#[test]
fn disabled_documents_are_skipped() {
    let (dir, loader) = temp_loader();
    let yaml = RULE_SET_YAML.replace("name: Circularity", "name: Circularity\n  enabled: false");
    fs::write(dir.path().join("off.yml"), yaml).unwrap();

    let loaded = loader.load_all().unwrap();
    assert!(loaded.documents.is_empty());
    assert!(matches!(
        &loaded.results[0].status,
        LoadStatus::Skipped { reason } if reason == "disabled"
    ));
}

#[test]
fn load_all_reports_failed_files() {
    let (dir, loader) = temp_loader();

    fs::write(dir.path().join("good.yml"), RULE_SET_YAML).unwrap();
    fs::write(dir.path().join("bad.yml"), "not valid yaml: [[[").unwrap();

    let loaded = loader.load_all().unwrap();
    assert_eq!(loaded.documents.len(), 1);
    assert_eq!(loaded.failures().count(), 1);

    let failed = loaded.failed_sources();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].ends_with("bad.yml"));
}

#[test]
fn missing_directory_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let loader = RuleLoader::new(dir.path().join("nope"));
    let loaded = loader.load_all().unwrap();
    assert!(loaded.documents.is_empty());
    assert!(loaded.results.is_empty());
}

#[test]
fn inline_source_reports_per_document() {
    let source = CatalogSource::Inline(vec![
        InlineDocument::new("thresholds.yml", THRESHOLDS_YAML),
        InlineDocument::new("broken.yml", "kind: [unterminated"),
        InlineDocument::new("circularity.yml", RULE_SET_YAML),
    ]);
    assert_eq!(source.describe(), "3 inline document(s)");

    let loaded = source.load().unwrap();
    assert_eq!(loaded.documents.len(), 2);
    assert_eq!(loaded.documents[0].origin, "thresholds.yml");
    assert_eq!(loaded.failed_sources(), ["broken.yml"]);
}

#[test]
fn empty_id_fails_validation() {
    let yaml = RULE_SET_YAML.replace("id: circularity", "id: \"\"");
    let err = parse_document(&yaml, "empty-id.yml").unwrap_err();
    assert!(matches!(err, ConfigError::Document { ref origin, .. } if origin == "empty-id.yml"));
    assert!(err.to_string().contains("metadata.id must not be empty"));
}

#[test]
fn unknown_kind_and_fields_are_rejected() {
    let unknown_kind = RULE_SET_YAML.replace("kind: RuleSet", "kind: Glossary");
    assert!(parse_document(&unknown_kind, "kind.yml").is_err());

    let extra_field = RULE_SET_YAML.replace("check: term_not_in_definition", "check: term_not_in_definition\n      severity: high");
    let err = parse_document(&extra_field, "extra.yml").unwrap_err();
    assert!(err.to_string().contains("failed to parse 'circularity'"));
}

#[test]
fn invalid_yaml_produces_error_not_panic() {
    let (dir, loader) = temp_loader();
    let bad_path = dir.path().join("bad.yml");
    fs::write(&bad_path, "this: is: not: valid: yaml: [[[").unwrap();

    assert!(matches!(loader.load_file(&bad_path), Err(ConfigError::Parse(_))));
}

fn dir_handle(dir: &TempDir) -> CatalogHandle {
    CatalogHandle::load(
        CatalogSource::Directory(dir.path().to_path_buf()),
        CheckRegistry::builtin(),
        CatalogOptions::default(),
    )
    .unwrap()
}

#[test]
fn yaml_events_rebuild_the_catalog() {
    let (dir, _loader) = temp_loader();
    fs::write(dir.path().join("thresholds.yml"), THRESHOLDS_YAML).unwrap();
    let rules = dir.path().join("circularity.yml");
    fs::write(&rules, RULE_SET_YAML).unwrap();
    let handle = dir_handle(&dir);
    assert_eq!(handle.current().generation(), 1);

    let event = Event::new(EventKind::Create(CreateKind::File)).add_path(rules.clone());
    handle_fs_event(&event, &handle);
    assert_eq!(handle.current().generation(), 2);

    let event = Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any))).add_path(rules);
    handle_fs_event(&event, &handle);
    assert_eq!(handle.current().generation(), 2, "metadata changes are ignored");
}

#[test]
fn irrelevant_paths_are_ignored() {
    let (dir, _loader) = temp_loader();
    fs::write(dir.path().join("thresholds.yml"), THRESHOLDS_YAML).unwrap();
    fs::write(dir.path().join("circularity.yml"), RULE_SET_YAML).unwrap();
    let handle = dir_handle(&dir);

    let event = Event::new(EventKind::Create(CreateKind::File))
        .add_path(dir.path().join("notes.txt"))
        .add_path(dir.path().join(".swap.yml"));
    handle_fs_event(&event, &handle);
    assert_eq!(handle.current().generation(), 1);
}

#[test]
fn failed_rebuild_keeps_previous_catalog() {
    let (dir, _loader) = temp_loader();
    fs::write(dir.path().join("thresholds.yml"), THRESHOLDS_YAML).unwrap();
    let rules = dir.path().join("circularity.yml");
    fs::write(&rules, RULE_SET_YAML).unwrap();
    let handle = dir_handle(&dir);

    fs::write(&rules, RULE_SET_YAML.replace("term_not_in_definition", "no_such_check")).unwrap();
    let event = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(rules);
    handle_fs_event(&event, &handle);

    let current = handle.current();
    assert_eq!(current.generation(), 1);
    assert!(current.rule("CIRC-01").is_some());
}

#[test]
fn watch_starts_on_existing_directory() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("thresholds.yml"), THRESHOLDS_YAML).unwrap();
    fs::write(dir.path().join("circularity.yml"), RULE_SET_YAML).unwrap();
    let handle = std::sync::Arc::new(dir_handle(&dir));

    loader.watch(handle).unwrap();
    assert_eq!(loader.rules_dir(), dir.path());
}
