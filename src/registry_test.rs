use super::*;

#[test]
fn list_kinds_is_stable_across_calls() {
    let registry = Registry::builtin();
    let first: Vec<&str> = registry.list_kinds().iter().map(|k| k.kind_id).collect();
    let second: Vec<&str> = registry.list_kinds().iter().map(|k| k.kind_id).collect();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn kind_ids_are_unique() {
    let registry = Registry::builtin();
    let mut ids: Vec<&str> = registry.list_kinds().iter().map(|k| k.kind_id).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn get_kind_finds_known_kind() {
    let registry = Registry::builtin();
    let mlp = registry.get_kind("mlp").unwrap();
    assert_eq!(mlp.display_name, "MLP");
    assert_eq!(mlp.category, BlockCategory::Layer);
    assert_eq!(mlp.backend_name, "mlp");
}

#[test]
fn get_kind_unknown_is_not_found() {
    let registry = Registry::builtin();
    let err = registry.get_kind("transformer").unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(ref id) if id == "transformer"));
    assert_eq!(err.error_code(), "E_KIND_NOT_FOUND");
    assert!(!err.retryable());
}

#[test]
fn every_category_is_represented() {
    let registry = Registry::builtin();
    for category in [BlockCategory::Layer, BlockCategory::Integrator, BlockCategory::Loss, BlockCategory::Dataset] {
        assert!(registry.kinds_in(category).next().is_some(), "no kinds for {category:?}");
    }
}

#[test]
fn dataset_kind_resolves() {
    let registry = Registry::builtin();
    let kind = registry.get_kind(DATASET_KIND_ID).unwrap();
    assert_eq!(kind.category, BlockCategory::Dataset);
}

#[test]
fn integrators_use_backend_method_names() {
    let registry = Registry::builtin();
    assert_eq!(registry.get_kind("euler").unwrap().backend_name, "diff_eq_integrator -- euler");
    assert_eq!(registry.get_kind("rk4").unwrap().backend_name, "diff_eq_integrator -- rk4");
}

#[test]
fn class_type_per_category() {
    assert_eq!(BlockCategory::Layer.class_type(), "neuromancer_block");
    assert_eq!(BlockCategory::Integrator.class_type(), "neuromancer_integrator");
    assert_eq!(BlockCategory::Loss.class_type(), "neuromancer_loss");
    assert_eq!(BlockCategory::Dataset.class_type(), "neuromancer_dataset");
}

#[test]
fn category_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&BlockCategory::Integrator).unwrap(), "\"integrator\"");
}

#[test]
fn custom_catalogue_is_respected() {
    static ONLY: &[BlockKind] = &[BlockKind {
        kind_id: "gru",
        display_name: "GRU",
        category: BlockCategory::Layer,
        default_size: Size { width: 10.0, height: 10.0 },
        backend_name: "gru",
    }];
    let registry = Registry::new(ONLY);
    assert_eq!(registry.list_kinds().len(), 1);
    assert!(registry.get_kind("gru").is_ok());
    assert!(registry.get_kind("mlp").is_err());
}
