//! Cross-provider aggregation over in-memory backends
//!
//! Several providers answer the same questions from fixed corpora; the
//! tests pin down result shape, enumeration order, merge rules, and how
//! registration changes ripple into later aggregations.

use std::sync::Arc;

use repoquery_core::Error;
use repoquery_core::aggregate::ProviderSet;
use repoquery_core::env::Environment;
use repoquery_core::provider::{Confine, ProviderRef, ProviderSpec};
use repoquery_core::registry::ProviderRegistry;
use repoquery_test_utils::MapBackend;

fn debian_registry() -> ProviderRegistry {
    ProviderRegistry::new(Environment::new("debian"))
}

/// Three providers with overlapping corpora, as a repeatable scenario.
fn populated_registry() -> ProviderRegistry {
    let mut registry = debian_registry();
    registry
        .register(
            ProviderSpec::new("util1").backend(Arc::new(
                MapBackend::new()
                    .candidate("apache2", "2.4.62-1")
                    .record("apache2", "2.4.62-1", &[("Section", "httpd")])
                    .candidate("bash", "5.2-1")
                    .record("bash", "5.2-1", &[("Section", "shells")]),
            )),
        )
        .unwrap();
    registry
        .register(
            ProviderSpec::new("util2").backend(Arc::new(
                MapBackend::new()
                    .candidate("bash", "5.2-2")
                    .record("bash", "5.2-2", &[("Section", "shells")])
                    .record("bash", "5.1-6", &[("Section", "shells")])
                    .candidate("alsa-base", "1.0.28-1")
                    .record("alsa-base", "1.0.28-1", &[("Section", "sound")]),
            )),
        )
        .unwrap();
    registry
        .register(ProviderSpec::new("util3").backend(Arc::new(MapBackend::new())))
        .unwrap();
    registry
}

fn provider_names<T>(results: &repoquery_core::aggregate::PerProvider<T>) -> Vec<&str> {
    results.keys().map(|name| name.as_str()).collect()
}

#[test]
fn candidates_fan_out_to_every_suitable_provider() {
    let mut registry = populated_registry();
    let results = registry
        .package_candidates(&["apache2", "bash", "alsa-base", "foo"], &ProviderSet::Suitable)
        .unwrap();

    assert_eq!(provider_names(&results), vec!["util1", "util2", "util3"]);
    assert_eq!(results["util1"]["apache2"], "2.4.62-1");
    assert_eq!(results["util1"]["bash"], "5.2-1");
    assert_eq!(results["util2"]["bash"], "5.2-2");
    assert_eq!(results["util2"]["alsa-base"], "1.0.28-1");
    assert!(
        results["util3"].is_empty(),
        "an empty provider still appears in the answer"
    );
    assert!(
        !results["util1"].contains_key("foo"),
        "unresolvable names are left out per provider"
    );
}

#[test]
fn listed_sets_mix_handles_and_names_in_call_order() {
    let mut registry = populated_registry();
    let util2 = registry.get("util2").unwrap();

    let set = ProviderSet::listed([ProviderRef::from(util2), ProviderRef::from("util1")]);
    let results = registry.package_candidates(&["bash"], &set).unwrap();

    assert_eq!(provider_names(&results), vec!["util2", "util1"]);
}

#[test]
fn unknown_listed_names_abort_with_the_offending_name() {
    let mut registry = populated_registry();
    let err = registry
        .package_candidates(&["bash"], &ProviderSet::listed(["util1", "nosuch"]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownProvider { name } if name == "nosuch"));
}

#[test]
fn versions_and_records_carry_per_version_detail() {
    let mut registry = populated_registry();

    let versions = registry
        .package_versions(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(versions["util1"]["bash"], vec!["5.2-1"]);
    assert_eq!(versions["util2"]["bash"], vec!["5.2-2", "5.1-6"]);

    let records = registry
        .package_records(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(records["util2"]["bash"]["5.1-6"]["Section"], "shells");
}

#[test]
fn confined_providers_drop_out_of_suitable_aggregations() {
    let mut registry = populated_registry();
    registry
        .register(
            ProviderSpec::new("ports")
                .backend(Arc::new(MapBackend::new().candidate("bash", "5.2.37")))
                .confine(Confine::os(["freebsd"])),
        )
        .unwrap();

    let results = registry
        .package_candidates(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(provider_names(&results), vec!["util1", "util2", "util3"]);

    let listed = registry
        .package_candidates(&["bash"], &ProviderSet::listed(["ports"]))
        .unwrap();
    assert_eq!(
        listed["ports"]["bash"], "5.2.37",
        "naming a confined provider explicitly still queries it"
    );
}

#[test]
fn prefix_hashes_merge_filters_and_arrays_concatenate() {
    let mut registry = populated_registry();

    let candidates = registry
        .package_candidates_with_prefixes(&["ba", "al"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(
        candidates["util2"].keys().collect::<Vec<_>>(),
        vec!["bash", "alsa-base"]
    );

    let names = registry
        .packages_with_prefixes(&["ba", "ba"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(
        names["util1"],
        vec!["bash", "bash"],
        "name lists concatenate filter results verbatim"
    );

    let versions = registry
        .package_versions_with_prefixes(&["ba"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(versions["util2"]["bash"], vec!["5.2-2", "5.1-6"]);

    let records = registry
        .package_records_with_prefixes(&["al"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(records["util2"]["alsa-base"]["1.0.28-1"]["Section"], "sound");
    assert!(records["util1"].is_empty());
}

#[test]
fn single_queries_are_cached_but_prefix_queries_are_not() {
    let mut registry = debian_registry();
    let backend = MapBackend::new()
        .candidate("bash", "5.2-1")
        .record("bash", "5.2-1", &[]);
    let counter = backend.retrieval_counter();
    registry
        .register(ProviderSpec::new("util1").backend(Arc::new(backend)))
        .unwrap();

    registry
        .package_candidates(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    registry
        .package_candidates(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(counter.get(), 1, "the second aggregation reads the cache");

    registry
        .package_candidates_with_prefixes(&["ba"], &ProviderSet::Suitable)
        .unwrap();
    registry
        .package_candidates_with_prefixes(&["ba"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(counter.get(), 3, "every prefix search retrieves fresh");
}

#[test]
fn reregistration_swaps_the_corpus_and_moves_the_provider_last() {
    let mut registry = populated_registry();
    registry
        .package_candidates(&["bash"], &ProviderSet::Suitable)
        .unwrap();

    registry
        .register(
            ProviderSpec::new("util1")
                .backend(Arc::new(MapBackend::new().candidate("bash", "6.0-1"))),
        )
        .unwrap();

    let results = registry
        .package_candidates(&["bash"], &ProviderSet::Suitable)
        .unwrap();
    assert_eq!(
        provider_names(&results),
        vec!["util2", "util3", "util1"],
        "a reloaded provider re-enters at the end"
    );
    assert_eq!(
        results["util1"]["bash"], "6.0-1",
        "the old registration's cache went with it"
    );
}

#[test]
fn default_provider_drives_singular_queries() {
    let mut registry = debian_registry();
    registry
        .register(
            ProviderSpec::new("apt")
                .backend(Arc::new(MapBackend::new().candidate("bash", "5.2-1")))
                .default_for(["debian"])
                .specificity(10),
        )
        .unwrap();
    registry
        .register(
            ProviderSpec::new("aptitude")
                .backend(Arc::new(MapBackend::new().candidate("bash", "5.2-9")))
                .specificity(9),
        )
        .unwrap();

    let default = registry.default_provider().unwrap();
    assert_eq!(default.name().as_str(), "apt");
    assert_eq!(
        default.package_candidate("bash").unwrap().as_deref(),
        Some("5.2-1")
    );
}
