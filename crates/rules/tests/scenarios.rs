//! End-to-end scenarios against the shipped rule catalog in `data/rules/`.

use std::path::PathBuf;
use std::sync::Arc;

use definitie_core::{Category, DefinitionItem, InputError};
use definitie_rules::batch::ItemState;
use definitie_rules::{
    validate_batch, BatchOptions, CatalogHandle, CatalogOptions, CatalogSource, CheckRegistry,
    DefinitionValidator, ValidateOptions,
};

/// Integration tests run from the crate directory, so go up two levels.
fn rules_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/rules")
}

fn validator() -> DefinitionValidator {
    let handle = CatalogHandle::load(
        CatalogSource::Directory(rules_dir()),
        CheckRegistry::builtin(),
        CatalogOptions { strict: true },
    )
    .unwrap_or_else(|e| panic!("shipped catalog must load: {}", e));
    DefinitionValidator::new(Arc::new(handle))
}

#[test]
fn shipped_catalog_is_complete() {
    let catalog = validator().catalog();
    assert_eq!(catalog.len(), 13);
    assert!(!catalog.is_degraded());
    assert_eq!(catalog.generation(), 1);
    for category in Category::ALL {
        assert!(
            !catalog.rules_for(&[category]).is_empty(),
            "no rules for {}",
            category
        );
    }
    assert!(catalog.rule("STR-03").is_some_and(|r| r.is_advisory()));
}

// ── Scenario A: circular definition ─────────────────────────

#[test]
fn circular_definition_is_rejected() {
    let result = validator()
        .validate("Contract", "Een Contract is een Contract.", &ValidateOptions::default())
        .unwrap();

    assert!(!result.is_acceptable);
    assert_eq!(result.overall_score, 0.65);

    let circ = result.category(Category::Circularity).unwrap();
    assert_eq!(circ.score, 0.5);
    assert_eq!(circ.violated_rules, ["CIRC-01"]);

    let violation = result.violations.iter().find(|v| v.code == "CIRC-01").unwrap();
    assert_eq!(violation.category, Category::Circularity);
    assert_eq!(violation.message, "definition repeats the term 'Contract'");
    assert!(result
        .rejection_reasons
        .contains(&"circularity score 0.50 is below minimum 0.75".to_string()));
    assert!(result.errored_rules.is_empty());
    assert!(!result.is_degraded());
}

// ── Scenario B: blank input ─────────────────────────────────

#[test]
fn blank_text_produces_no_result() {
    let validator = validator();
    let err = validator
        .validate("Besluit", "   \n\t", &ValidateOptions::default())
        .unwrap_err();
    assert_eq!(err, InputError::EmptyText);

    let err = validator
        .validate("  ", "een schriftelijke beslissing", &ValidateOptions::default())
        .unwrap_err();
    assert_eq!(err, InputError::EmptyTerm);
}

#[test]
fn correlation_id_is_echoed_or_generated() {
    let validator = validator();
    let text = "periode waarbinnen een handeling moet plaatsvinden";

    let supplied = validator
        .validate("Termijn", text, &ValidateOptions::default().with_correlation_id("req-42"))
        .unwrap();
    assert_eq!(supplied.correlation_id, "req-42");

    let a = validator.validate("Termijn", text, &ValidateOptions::default()).unwrap();
    let b = validator.validate("Termijn", text, &ValidateOptions::default()).unwrap();
    assert!(!a.correlation_id.is_empty());
    assert_ne!(a.correlation_id, b.correlation_id);
    assert!(a.same_outcome(&b));
}

#[test]
fn whitespace_and_case_do_not_change_the_outcome() {
    let validator = validator();
    let options = ValidateOptions::default();
    let a = validator.validate("Contract", "Een Contract is een Contract.", &options).unwrap();
    let b = validator
        .validate("  contract ", "een   CONTRACT\n is een contract.", &options)
        .unwrap();
    assert_eq!(a.overall_score, b.overall_score);
    assert_eq!(a.summary().violations, b.summary().violations);
}

// ── Scenario C: concurrent batch equals sequential ──────────

fn ten_items() -> Vec<DefinitionItem> {
    vec![
        DefinitionItem::new("Contract", "Een Contract is een Contract."),
        DefinitionItem::new(
            "Huurovereenkomst",
            "overeenkomst waarbij een partij een zaak tegen betaling in gebruik geeft aan een andere partij",
        ),
        DefinitionItem::new("Besluit", "schriftelijke beslissing van een bestuursorgaan"),
        DefinitionItem::new("Vergunningen", "Iets (bijvoorbeeld een document) dat altijd nodig is."),
        DefinitionItem::new("Termijn", "periode waarbinnen een handeling moet plaatsvinden"),
        DefinitionItem::new("Bezwaar", ""),
        DefinitionItem::new("Het Register", "openbare lijst van ingeschreven gegevens"),
        DefinitionItem::new("Aanvraag", "verzoek om een besluit te nemen, enzovoort"),
        DefinitionItem::new("Belanghebbende", "persoon wiens belang rechtstreeks bij een besluit is betrokken"),
        DefinitionItem::new("Mandaat", "bevoegdheid om namens een bestuursorgaan besluiten te nemen waarbij"),
    ]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batch_matches_sequential() {
    let validator = validator();

    let sequential = validate_batch(&validator, ten_items(), &BatchOptions::sequential())
        .await
        .unwrap();
    let concurrent = validate_batch(&validator, ten_items(), &BatchOptions::concurrent(5))
        .await
        .unwrap();

    assert_eq!(concurrent.items.len(), 10);
    assert!(!concurrent.partial);
    sequential.ensure_matches(&concurrent).unwrap();

    assert_eq!(concurrent.items[5].state, ItemState::Errored);
    assert_eq!(concurrent.items[5].input_error, Some(InputError::EmptyText));
    assert_eq!(concurrent.completed(), 9);

    for (item, input) in concurrent.items.iter().zip(ten_items()) {
        if let Some(result) = &item.result {
            assert_eq!(result.term, input.term);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_results_equal_single_validation() {
    let validator = validator();
    let report = validate_batch(&validator, ten_items(), &BatchOptions::concurrent(3))
        .await
        .unwrap();

    for (item, input) in report.items.iter().zip(ten_items()) {
        match validator.validate_item(&input) {
            Ok(single) => assert!(item.result.as_ref().is_some_and(|r| r.same_outcome(&single))),
            Err(e) => assert_eq!(item.input_error.as_ref(), Some(&e)),
        }
    }
}

#[test]
fn article_and_dangling_qualifier_are_reported() {
    let validator = validator();
    let options = ValidateOptions::default();

    let register = validator
        .validate("Het Register", "openbare lijst van ingeschreven gegevens", &options)
        .unwrap();
    assert_eq!(register.summary().violations, ["GRAM-02"]);

    let mandaat = validator
        .validate(
            "Mandaat",
            "bevoegdheid om namens een bestuursorgaan besluiten te nemen waarbij",
            &options,
        )
        .unwrap();
    assert_eq!(mandaat.summary().violations, ["COH-02"]);
    let coherence = mandaat.category(Category::Coherence).unwrap();
    assert_eq!(coherence.score, 0.5);
}
