use std::sync::Arc;

use super::common::*;

use crate::workflows::scholarship::domain::{ApplicationStatus, ScholarshipId};
use crate::workflows::scholarship::models::{
    default_weights, InMemoryModelRepository, ModelScope, ModelStore, ModelType, WeightCache,
};
use crate::workflows::scholarship::regression::DEFAULT_MIN_SAMPLES;
use crate::workflows::scholarship::selection::{ModelSelector, SelectionError};

fn publish_both_scopes(
    store: &ModelStore<InMemoryModelRepository>,
) {
    store
        .publish(model_with(ModelScope::Global, default_weights(), -1.0))
        .expect("global publish");
    store
        .publish(model_with(
            ModelScope::Scholarship(merit_id()),
            default_weights(),
            -0.5,
        ))
        .expect("scholarship publish");
}

#[test]
fn below_threshold_falls_back_to_global() {
    let store = memory_store();
    publish_both_scopes(&store);
    let history = Arc::new(MemoryHistory::with(decided_history(&merit_id(), 29)));
    let selector = ModelSelector::new(store, history);

    let selected = selector.select_model(&merit_id()).expect("model selected");
    assert_eq!(selector.min_samples_per_scholarship(), DEFAULT_MIN_SAMPLES);
    assert_eq!(selected.model_type, ModelType::Global);
    assert_eq!(selected.historical_samples, 29);
    assert_eq!(selected.model.scope, ModelScope::Global);
}

#[test]
fn threshold_reached_with_active_specific_model_selects_it() {
    let store = memory_store();
    publish_both_scopes(&store);
    let history = Arc::new(MemoryHistory::with(decided_history(&merit_id(), 30)));
    let selector = ModelSelector::new(store, history);

    let selected = selector.select_model(&merit_id()).expect("model selected");
    assert_eq!(selected.model_type, ModelType::ScholarshipSpecific);
    assert_eq!(selected.model.bias, -0.5);
}

#[test]
fn threshold_reached_without_specific_model_uses_global() {
    let store = memory_store();
    store
        .publish(model_with(ModelScope::Global, default_weights(), -1.0))
        .expect("global publish");
    let history = Arc::new(MemoryHistory::with(decided_history(&merit_id(), 45)));
    let selector = ModelSelector::new(store, history);

    let selected = selector.select_model(&merit_id()).expect("model selected");
    assert_eq!(selected.model_type, ModelType::Global);
}

#[test]
fn undecided_and_foreign_applications_do_not_count() {
    let store = memory_store();
    publish_both_scopes(&store);
    let mut applications = decided_history(&merit_id(), 29);
    let mut pending = historical(&merit_id(), 99, true);
    pending.status = ApplicationStatus::UnderReview;
    applications.push(pending);
    applications.extend(decided_history(&ScholarshipId("need-2025".to_string()), 10));
    let selector = ModelSelector::new(store, Arc::new(MemoryHistory::with(applications)));

    let selected = selector.select_model(&merit_id()).expect("model selected");
    assert_eq!(selected.historical_samples, 29);
    assert_eq!(selected.model_type, ModelType::Global);
}

#[test]
fn custom_threshold_is_honoured() {
    let store = memory_store();
    publish_both_scopes(&store);
    let history = Arc::new(MemoryHistory::with(decided_history(&merit_id(), 5)));
    let selector = ModelSelector::with_threshold(store, history, 5);

    let selected = selector.select_model(&merit_id()).expect("model selected");
    assert_eq!(selected.model_type, ModelType::ScholarshipSpecific);
}

#[test]
fn no_active_models_is_model_unavailable() {
    let history = Arc::new(MemoryHistory::with(decided_history(&merit_id(), 40)));
    let selector = ModelSelector::new(memory_store(), history);

    match selector.select_model(&merit_id()) {
        Err(SelectionError::ModelUnavailable { scholarship_id }) => {
            assert_eq!(scholarship_id, merit_id())
        }
        other => panic!("expected model unavailable, got {other:?}"),
    }
}

#[test]
fn store_failures_surface_as_repository_errors() {
    let store = Arc::new(ModelStore::new(
        Arc::new(UnavailableModels),
        Arc::new(WeightCache::new()),
    ));
    let selector = ModelSelector::new(store, Arc::new(MemoryHistory::default()));

    assert!(matches!(
        selector.select_model(&merit_id()),
        Err(SelectionError::Repository(_))
    ));
}
