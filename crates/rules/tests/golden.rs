//! Golden summaries for representative definitions against `data/rules/`.
//!
//! Files under `tests/golden/` hold the expected [`ValidationSummary`] JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use definitie_rules::{
    CatalogHandle, CatalogOptions, CatalogSource, CheckRegistry, DefinitionValidator,
    ValidateOptions, ValidationSummary,
};

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn validator() -> DefinitionValidator {
    let handle = CatalogHandle::load(
        CatalogSource::Directory(manifest_dir().join("../../data/rules")),
        CheckRegistry::builtin(),
        CatalogOptions::default(),
    )
    .unwrap();
    DefinitionValidator::new(Arc::new(handle))
}

fn golden(name: &str) -> ValidationSummary {
    let path: PathBuf = manifest_dir().join("tests/golden").join(name);
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

fn summary(term: &str, text: &str) -> ValidationSummary {
    validator()
        .validate(term, text, &ValidateOptions::default())
        .unwrap()
        .summary()
}

#[test]
fn contract_golden() {
    assert_eq!(
        summary("Contract", "Een Contract is een Contract."),
        golden("contract.json")
    );
}

#[test]
fn huurovereenkomst_golden() {
    assert_eq!(
        summary(
            "Huurovereenkomst",
            "overeenkomst waarbij een partij een zaak tegen betaling in gebruik geeft aan een andere partij",
        ),
        golden("huurovereenkomst.json")
    );
}

#[test]
fn vergunningen_golden() {
    assert_eq!(
        summary(
            "Vergunningen",
            "Iets (bijvoorbeeld een document) dat altijd nodig is. Zie ook de wet.",
        ),
        golden("vergunningen.json")
    );
}

#[test]
fn summary_json_round_trips_through_serde() {
    let expected = golden("contract.json");
    let json = serde_json::to_string_pretty(&expected).unwrap();
    let back: ValidationSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expected);
}
