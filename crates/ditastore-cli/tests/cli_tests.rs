//! Command line parsing and end-to-end runs

use ditastore_cli::{command, config_from_args, run};
use ditastore_test_utils::{write_map, LocalRepoFixture};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn sub_matches(argv: &[&str]) -> clap::ArgMatches {
    let matches = command().try_get_matches_from(argv).unwrap();
    matches.subcommand().unwrap().1.clone()
}

#[test]
fn flags_build_config() {
    let args = sub_matches(&[
        "ditastore",
        "pull-topics",
        "--map",
        "src/guide.ditamap",
        "-o",
        "build",
        "--no-overwrite",
        "--remote-repo",
        "https://a.example/maven2",
        "--remote-repo",
        "https://b.example/maven2",
        "--element",
        "topicref",
        "--element",
        "mapref",
    ]);
    let config = config_from_args(&args).unwrap();

    assert_eq!(config.map_file, PathBuf::from("src/guide.ditamap"));
    assert_eq!(config.output_directory, PathBuf::from("build"));
    assert!(!config.overwrite);
    assert_eq!(config.remote_repositories.len(), 2);
    assert_eq!(config.reference_elements, vec!["topicref".to_string(), "mapref".to_string()]);
    assert!(config.match_specializations);
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("ditastore.toml");
    std::fs::write(
        &file,
        "map-file = \"from-file.ditamap\"\noutput-directory = \"file-out\"\nremote-repositories = [\"https://file.example\"]\n",
    )
    .unwrap();

    let args = sub_matches(&[
        "ditastore",
        "plan",
        "--config",
        file.to_str().unwrap(),
        "--output-dir",
        "flag-out",
        "--remote-repo",
        "https://flag.example",
    ]);
    let config = config_from_args(&args).unwrap();

    assert_eq!(config.map_file, PathBuf::from("from-file.ditamap"));
    assert_eq!(config.output_directory, PathBuf::from("flag-out"));
    assert_eq!(
        config.remote_repositories,
        vec!["https://file.example".to_string(), "https://flag.example".to_string()]
    );
}

#[test]
fn missing_map_is_an_error() {
    let args = sub_matches(&["ditastore", "pull-topics"]);
    assert!(config_from_args(&args).is_err());
}

#[test]
fn verbosity_is_global() {
    let matches = command()
        .try_get_matches_from(["ditastore", "plan", "--map", "m.ditamap", "-vv"])
        .unwrap();
    assert_eq!(matches.get_count("verbose"), 2);
}

#[test]
fn pull_topics_json_report() {
    let repo = LocalRepoFixture::new();
    repo.install_file("m2:com.acme:guide:1.0:dita", "<topic/>");
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &["m2:com.acme:guide:1.0:dita"]);
    let out = work.path().join("out");

    let matches = command()
        .try_get_matches_from([
            "ditastore",
            "pull-topics",
            "--map",
            map.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
            "--local-repo",
            repo.root().to_str().unwrap(),
            "--json",
        ])
        .unwrap();
    let output = run(&matches).unwrap();

    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["references"][0]["strategy"], "retrieve-whole");
    assert!(out.join("book.ditamap").is_file());
}

#[test]
fn plan_prints_destinations() {
    let work = tempfile::tempdir().unwrap();
    let map = write_map(
        work.path(),
        "book.ditamap",
        &["m2:com.acme:bundle:2.3::zip:docs/page1.dita"],
    );

    let matches = command()
        .try_get_matches_from([
            "ditastore",
            "plan",
            "--map",
            map.to_str().unwrap(),
            "--topics-dir",
            "/out/topics",
            "--local-repo",
            "/nonexistent",
        ])
        .unwrap();
    let output = run(&matches).unwrap();

    assert_eq!(
        output,
        "  m2:com.acme:bundle:2.3::zip:docs/page1.dita -> /out/topics/docs/page1.dita (extract-member)\n"
    );
}
