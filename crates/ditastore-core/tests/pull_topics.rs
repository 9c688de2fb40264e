//! End-to-end runs against a local repository fixture

use ditastore_core::{plan_topics, pull_topics, ErrorKind, PullTopicsConfig};
use ditastore_resolve::ResolutionStrategy;
use ditastore_test_utils::{map_with_hrefs, write_map, LocalRepoFixture};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

const GUIDE: &str = "m2:com.acme:guide:1.0:dita";
const BUNDLE_PAGE: &str = "m2:com.acme:bundle:2.3::zip:docs/page1.dita";

fn fixture_repo() -> LocalRepoFixture {
    let repo = LocalRepoFixture::new();
    repo.install_file(GUIDE, "<topic id=\"guide\"/>");
    repo.install_zip(
        "m2:com.acme:bundle:2.3:zip",
        &[("docs/page1.dita", "<topic id=\"p1\"/>"), ("docs/page2.dita", "<topic id=\"p2\"/>")],
    );
    repo
}

fn config(work: &Path, map: &Path, repo: &LocalRepoFixture) -> PullTopicsConfig {
    PullTopicsConfig::new(map)
        .with_output_directory(work.join("target"))
        .with_local_repository(repo.root())
}

#[test]
fn resolves_whole_and_member_references() {
    let repo = fixture_repo();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &[GUIDE, "local/intro.dita", BUNDLE_PAGE]);

    let report = pull_topics(&config(work.path(), &map, &repo)).unwrap();

    let topics = work.path().join("target/dita-topics");
    let guide = topics.join("com.acme/guide.dita");
    let page = topics.join("docs/page1.dita");
    assert_eq!(fs::read_to_string(&guide).unwrap(), "<topic id=\"guide\"/>");
    assert_eq!(fs::read_to_string(&page).unwrap(), "<topic id=\"p1\"/>");
    assert!(topics.join("docs/page2.dita").is_file());

    let expected = map_with_hrefs(&[
        &guide.display().to_string(),
        "local/intro.dita",
        &page.display().to_string(),
    ]);
    assert_eq!(fs::read_to_string(&report.output_file).unwrap(), expected);

    let strategies: Vec<_> = report.references.iter().map(|r| r.strategy).collect();
    assert_eq!(strategies, vec![ResolutionStrategy::RetrieveWhole, ResolutionStrategy::ExtractMember]);
    assert_eq!(
        report.references[0].digest,
        ditastore_artifact::ContentHash::compute(b"<topic id=\"guide\"/>")
    );
}

#[test]
fn map_without_references_round_trips() {
    let repo = LocalRepoFixture::new();
    let work = tempfile::tempdir().unwrap();
    let text = "<?xml version=\"1.0\"?>\n<!-- header -->\n<map  title='x'>\n\t<topicref href=\"a.dita\" />\n</map>";
    let map = work.path().join("plain.ditamap");
    fs::write(&map, text).unwrap();

    let report = pull_topics(&config(work.path(), &map, &repo)).unwrap();
    assert!(report.references.is_empty());
    assert_eq!(fs::read_to_string(report.output_file).unwrap(), text);
}

#[test]
fn repeated_runs_produce_identical_output() {
    let repo = fixture_repo();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &[GUIDE, BUNDLE_PAGE]);
    let config = config(work.path(), &map, &repo);

    let first = pull_topics(&config).unwrap();
    let first_text = fs::read_to_string(&first.output_file).unwrap();
    let second = pull_topics(&config).unwrap();

    assert_eq!(first.references, second.references);
    assert_eq!(fs::read_to_string(&second.output_file).unwrap(), first_text);
}

#[test]
fn overwrite_off_keeps_existing_topics() {
    let repo = fixture_repo();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &[GUIDE]);

    let existing = work.path().join("target/dita-topics/com.acme/guide.dita");
    fs::create_dir_all(existing.parent().unwrap()).unwrap();
    fs::write(&existing, "<topic id=\"local-edit\"/>").unwrap();

    pull_topics(&config(work.path(), &map, &repo).with_overwrite(false)).unwrap();
    assert_eq!(fs::read_to_string(&existing).unwrap(), "<topic id=\"local-edit\"/>");

    pull_topics(&config(work.path(), &map, &repo)).unwrap();
    assert_eq!(fs::read_to_string(&existing).unwrap(), "<topic id=\"guide\"/>");
}

#[test]
fn missing_artifact_leaves_no_output() {
    let repo = LocalRepoFixture::new();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &[GUIDE]);

    let err = pull_topics(&config(work.path(), &map, &repo)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FetchFailure);
    assert!(!work.path().join("target/book.ditamap").exists());
}

#[test]
fn member_missing_from_archive() {
    let repo = fixture_repo();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &["m2:com.acme:bundle:2.3::zip:docs/absent.dita"]);

    let err = pull_topics(&config(work.path(), &map, &repo)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolvedFileMissing);
}

#[test]
fn tar_archives_are_extracted() {
    let repo = LocalRepoFixture::new();
    repo.install_tar("m2:com.acme:bundle:3.0:tar", &[("guide/topic.dita", "<topic/>")]);
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &["m2:com.acme:bundle:3.0::tar:guide/topic.dita"]);

    let report = pull_topics(&config(work.path(), &map, &repo)).unwrap();
    assert_eq!(
        report.references[0].path,
        work.path().join("target/dita-topics/guide/topic.dita")
    );
}

#[test]
fn plan_lists_destinations_without_fetching() {
    let repo = LocalRepoFixture::new();
    let work = tempfile::tempdir().unwrap();
    let map = write_map(work.path(), "book.ditamap", &[GUIDE, BUNDLE_PAGE]);

    let plan = plan_topics(&config(work.path(), &map, &repo).with_topics_directory("/out/topics")).unwrap();
    let paths: Vec<_> = plan.iter().map(|p| p.expected_path.display().to_string()).collect();
    assert_eq!(paths, vec!["/out/topics/com.acme/guide.dita", "/out/topics/docs/page1.dita"]);
    assert!(!work.path().join("target").exists());
}
