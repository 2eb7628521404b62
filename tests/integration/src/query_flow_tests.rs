//! End-to-end query flows over scripted package tools
//!
//! These tests wire the builtin loader, a scripted command runner, and a
//! fabricated host together, then drive the query surface the way an
//! embedding application would: look a provider up, ask for candidates and
//! records, and watch the caches and subprocess calls.

use std::io::Write;
use std::sync::Arc;

use repoquery_backends::apt::DEFAULT_APT_CACHE;
use repoquery_backends::aptitude::DEFAULT_APTITUDE;
use repoquery_backends::ports::DEFAULT_MAKE;
use repoquery_backends::{BackendConfig, BuiltinLoader};
use repoquery_core::Error;
use repoquery_core::env::{Environment, StaticProbe};
use repoquery_core::registry::ProviderRegistry;
use repoquery_exec::Invocation;
use repoquery_test_utils::ScriptedRunner;
use repoquery_test_utils::fixtures::{APT_POLICY_APACHE, APT_SHOW_APACHE2, PORTS_SEARCH_MIXED};

fn registry_for(os: &str, tools: &[&str], runner: Arc<ScriptedRunner>) -> ProviderRegistry {
    let env = Environment::with_probe(os, Arc::new(StaticProbe::new(tools.iter().copied())));
    let loader = BuiltinLoader::with_runner(BackendConfig::default(), runner);
    ProviderRegistry::with_loader(env, Arc::new(loader))
}

fn policy(pattern: &str) -> Invocation {
    Invocation::new(DEFAULT_APT_CACHE)
        .args(["-q=2", "-a", "policy"])
        .arg(pattern)
}

fn show(pattern: &str) -> Invocation {
    Invocation::new(DEFAULT_APT_CACHE)
        .args(["-q=2", "-a", "show"])
        .arg(pattern)
}

fn ports_search(tree: &str, pattern: &str) -> Invocation {
    Invocation::new(DEFAULT_MAKE)
        .arg("-C")
        .arg(tree)
        .arg("search")
        .arg(format!("name={pattern}"))
}

#[test]
fn apt_candidate_flow_caches_the_whole_policy_harvest() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(policy("^apache2$"), APT_POLICY_APACHE);
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").expect("builtin apt registers on demand");
    assert_eq!(
        apt.package_candidate("apache2").unwrap().as_deref(),
        Some("2.4.62-1~deb12u2")
    );
    assert_eq!(
        apt.package_candidate("apache2-utils").unwrap().as_deref(),
        Some("2.4.62-1~deb12u2"),
        "the sibling package came along in the same harvest"
    );
    assert_eq!(runner.call_count(), 1);
}

#[test]
fn apt_record_flow_pairs_show_with_policy() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(show("^apache2$"), APT_SHOW_APACHE2);
    runner.respond(policy("^apache2$"), APT_POLICY_APACHE);
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").unwrap();
    let versions = apt.package_versions("apache2").unwrap().unwrap();
    assert_eq!(versions, vec!["2.4.62-1~deb12u2", "2.4.57-2"]);
    assert_eq!(runner.call_count(), 2, "one show run, one policy run");

    let records = apt.package_records("apache2").unwrap().unwrap();
    assert!(records["2.4.62-1~deb12u2"]["Description-en"].starts_with("Apache HTTP Server"));
    assert_eq!(runner.call_count(), 2, "the record cache answers the repeat");
}

#[test]
fn missing_packages_resolve_to_none() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.fail(policy("^nosuch$"), 100, "E: No packages found");
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").unwrap();
    assert_eq!(apt.package_candidate("nosuch").unwrap(), None);
}

#[test]
fn ill_formed_names_never_reach_a_subprocess() {
    let runner = Arc::new(ScriptedRunner::new());
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").unwrap();
    assert!(matches!(
        apt.package_candidate("Not A Package"),
        Err(Error::IllFormedName { .. })
    ));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn aptitude_flow_splits_records_and_candidates_across_tools() {
    let aptitude_show_bash = "\
Package: bash
Version: 5.2-1
State: installed
Section: shells
Description: GNU Bourne Again SHell
 Bash is an sh-compatible command language interpreter.
";
    let apt_policy_bash = "\
bash:
  Installed: 5.2-1
  Candidate: 5.2-1
  Version table:
";

    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(
        Invocation::new(DEFAULT_APTITUDE)
            .args(["-q=2", "show"])
            .arg("~n^bash$")
            .env("DEBIAN_FRONTEND", "noninteractive"),
        aptitude_show_bash,
    );
    runner.respond(policy("^bash$"), apt_policy_bash);
    let mut registry = registry_for(
        "debian",
        &["/usr/bin/apt-cache", "/usr/bin/aptitude"],
        runner.clone(),
    );

    let aptitude = registry.lookup("aptitude").unwrap();
    assert_eq!(aptitude.parent().unwrap().as_str(), "apt");

    let records = aptitude.package_records("bash").unwrap().unwrap();
    assert_eq!(records["5.2-1"]["Section"], "shells");
    assert_eq!(
        aptitude.package_candidate("bash").unwrap().as_deref(),
        Some("5.2-1"),
        "the record retrieval already cached the candidate"
    );
    assert_eq!(runner.call_count(), 2);
}

#[test]
fn ports_flow_fills_both_caches_from_one_search() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(
        ports_search("/usr/ports", "^apache24(-[A-Za-z0-9][A-Za-z0-9.,_]*)$"),
        PORTS_SEARCH_MIXED,
    );
    runner.respond(
        ports_search("/usr/ports", "^apache22(-[A-Za-z0-9][A-Za-z0-9.,_]*)$"),
        "",
    );
    let mut registry = registry_for("freebsd", &["/usr/bin/make", "/usr/ports"], runner.clone());

    let ports = registry.lookup("ports").unwrap();
    assert_eq!(
        ports.package_candidate("apache24").unwrap().as_deref(),
        Some("2.4.62")
    );

    let records = ports.package_records("apache24").unwrap().unwrap();
    assert_eq!(records["2.4.62"]["Path"], "/usr/ports/www/apache24");
    assert_eq!(
        ports.package_candidate("bash").unwrap().as_deref(),
        Some("5.2.37")
    );
    assert_eq!(runner.call_count(), 1, "one make search warmed both caches");

    assert_eq!(
        ports.package_candidate("apache22").unwrap(),
        None,
        "moved ports are invisible"
    );
}

#[test]
fn netbsd_flow_searches_the_pkgsrc_tree() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(
        ports_search("/usr/pkgsrc", "^bash(-[A-Za-z0-9][A-Za-z0-9.,_]*)$"),
        "Port:   bash-5.2.37\nPath:   /usr/pkgsrc/shells/bash\nInfo:   Bourne Again SHell\n",
    );
    let mut registry = registry_for("netbsd", &["/usr/bin/make", "/usr/pkgsrc"], runner.clone());

    let ports = registry.lookup("ports").unwrap();
    assert_eq!(
        ports.package_candidate("bash").unwrap().as_deref(),
        Some("5.2.37")
    );
}

#[test]
fn prefix_discovery_searches_fresh_every_time() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(policy("^apache"), APT_POLICY_APACHE);
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").unwrap();
    let names = apt.packages_with_prefix("apache").unwrap();
    assert_eq!(names, vec!["apache2", "apache2-utils"]);

    let names = apt.packages_with_prefix("apache").unwrap();
    assert_eq!(names, vec!["apache2", "apache2-utils"]);
    assert_eq!(runner.call_count(), 2, "prefix queries bypass the cache");
}

#[test]
fn debian_hosts_answer_unnamed_queries_through_apt() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(
        policy("^bash$"),
        "bash:\n  Installed: (none)\n  Candidate: 5.2-1\n  Version table:\n",
    );
    let mut registry = registry_for(
        "debian",
        &["/usr/bin/apt-cache", "/usr/bin/aptitude"],
        runner.clone(),
    );

    let default = registry.default_provider().expect("a debian host has a default");
    assert_eq!(default.name().as_str(), "apt");
    assert_eq!(
        default.package_candidate("bash").unwrap().as_deref(),
        Some("5.2-1")
    );
}

#[test]
fn configured_tool_paths_flow_from_file_to_invocation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "apt_cache = \"/opt/apt/bin/apt-cache\"").unwrap();
    let config = BackendConfig::load(file.path()).unwrap();

    let runner = Arc::new(ScriptedRunner::new());
    runner.respond(
        Invocation::new("/opt/apt/bin/apt-cache")
            .args(["-q=2", "-a", "policy"])
            .arg("^bash$"),
        "bash:\n  Installed: (none)\n  Candidate: 5.2-1\n  Version table:\n",
    );
    let env = Environment::with_probe(
        "debian",
        Arc::new(StaticProbe::new(["/opt/apt/bin/apt-cache"])),
    );
    let loader = BuiltinLoader::with_runner(config, runner.clone());
    let mut registry = ProviderRegistry::with_loader(env, Arc::new(loader));

    let apt = registry.lookup("apt").unwrap();
    assert!(apt.is_suitable(registry.environment()));
    assert_eq!(
        apt.package_candidate("bash").unwrap().as_deref(),
        Some("5.2-1")
    );
}

#[test]
fn broken_tools_surface_as_errors() {
    let runner = Arc::new(ScriptedRunner::new());
    runner.fail(
        policy("^bash$"),
        100,
        "E: The package cache file is corrupted",
    );
    let mut registry = registry_for("debian", &["/usr/bin/apt-cache"], runner.clone());

    let apt = registry.lookup("apt").unwrap();
    let err = apt.package_candidate("bash").unwrap_err();
    assert!(matches!(err, Error::Exec(_)));
}
