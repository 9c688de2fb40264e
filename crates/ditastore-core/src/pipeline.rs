//! Rewrite orchestrator
//!
//! Drives one map document through
//!
//! ```text
//! Loaded → Scanning → Resolving(0) → … → Resolving(n-1) → Rewritten → Serialized
//!    └──────────┴────────────┴──────────────────┴─────────────┴──→ Failed
//! ```
//!
//! Each reference is parsed, mapped to a request, fetched and checked on disk
//! before its `href` is replaced with the absolute local path. The first
//! failure ends the pass: later references are not attempted and nothing is
//! written.

use crate::config::PullTopicsConfig;
use crate::error::{PipelineError, PipelineResult, ReferenceError};
use ditastore_artifact::{ArtifactCoordinate, ContentHash};
use ditastore_map::{MapDocument, ReferenceScanner, TopicRef};
use ditastore_resolve::{fetch, ArtifactFetcher, FetchError, ResolutionStrategy, StrategySelector};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    /// Document loaded, nothing scanned yet
    Loaded,
    /// Looking for `m2:` references
    Scanning,
    /// Working on the reference with this index
    Resolving(usize),
    /// All references replaced in memory
    Rewritten,
    /// Document written
    Serialized,
    /// Pass aborted
    Failed,
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
    use PipelineState::{Failed, Loaded, Resolving, Rewritten, Scanning, Serialized};
    match from {
        Loaded => vec![Scanning, Failed],
        Scanning => vec![Resolving(0), Rewritten, Failed],
        Resolving(i) => vec![Resolving(i + 1), Rewritten, Failed],
        Rewritten => vec![Serialized, Failed],
        Serialized | Failed => vec![],
    }
}

/// Check a transition against [`allowed_transitions`]
///
/// # Errors
/// Returns [`PipelineError::IllegalTransition`] if `to` is not reachable
pub fn validate_transition(from: PipelineState, to: PipelineState) -> PipelineResult<()> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}

/// One reference replaced by a local path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    /// Original `href`
    pub href: String,
    /// Strategy used
    pub strategy: ResolutionStrategy,
    /// Absolute local path now in the `href`
    pub path: PathBuf,
    /// Digest of the resolved file
    pub digest: ContentHash,
}

/// One reference as it would be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedReference {
    /// Original `href`
    pub href: String,
    /// Strategy that would be used
    pub strategy: ResolutionStrategy,
    /// Path the reference would resolve to
    pub expected_path: PathBuf,
}

/// Outcome of a completed pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    /// Input map
    pub map_file: PathBuf,
    /// Written map
    pub output_file: PathBuf,
    /// References in document order
    pub references: Vec<ResolvedReference>,
}

/// Sequential rewrite of one document at a time
#[derive(Debug)]
pub struct RewriteOrchestrator<F> {
    fetcher: F,
    selector: StrategySelector,
    scanner: ReferenceScanner,
    state: PipelineState,
    trace: Vec<PipelineState>,
}

impl<F: ArtifactFetcher> RewriteOrchestrator<F> {
    /// Create orchestrator
    #[must_use]
    pub fn new(fetcher: F, selector: StrategySelector, scanner: ReferenceScanner) -> Self {
        Self {
            fetcher,
            selector,
            scanner,
            state: PipelineState::Loaded,
            trace: Vec::new(),
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States visited during the last pass
    #[inline]
    #[must_use]
    pub fn trace(&self) -> &[PipelineState] {
        &self.trace
    }

    /// Fetcher in use
    #[inline]
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load, rewrite and write a map
    ///
    /// # Errors
    /// Any [`PipelineError`]; on error no output file is produced
    pub fn run(&mut self, map_file: &Path, output_directory: &Path) -> PipelineResult<RewriteReport> {
        let mut document = match MapDocument::load(map_file) {
            Ok(document) => document,
            Err(e) => {
                self.state = PipelineState::Failed;
                self.trace = vec![PipelineState::Failed];
                tracing::error!(map = %map_file.display(), error = %e, "Cannot load map");
                return Err(PipelineError::Load(e));
            }
        };
        tracing::info!(map = %map_file.display(), "Processing map");

        let references = self.rewrite(&mut document)?;
        let output_file = self.serialize(&document, output_directory)?;

        tracing::info!(
            map = %map_file.display(),
            output = %output_file.display(),
            references = references.len(),
            "Map rewritten"
        );
        Ok(RewriteReport {
            map_file: map_file.to_path_buf(),
            output_file,
            references,
        })
    }

    /// Resolve every `m2:` reference and record the replacements
    ///
    /// Ends in `Rewritten` on success, `Failed` otherwise.
    ///
    /// # Errors
    /// [`PipelineError::Reference`] for the first reference that fails
    pub fn rewrite(&mut self, document: &mut MapDocument) -> PipelineResult<Vec<ResolvedReference>> {
        self.state = PipelineState::Loaded;
        self.trace = vec![PipelineState::Loaded];

        self.transition(PipelineState::Scanning)?;
        let nodes = match self.scanner.scan(document) {
            Ok(nodes) => nodes,
            Err(e) => return Err(self.fail(PipelineError::Load(e))),
        };

        let mut resolved = Vec::with_capacity(nodes.len());
        for node in &nodes {
            self.transition(PipelineState::Resolving(node.index()))?;
            match self.resolve_one(node).and_then(|r| {
                document.set_href(node, &r.path.to_string_lossy())?;
                Ok(r)
            }) {
                Ok(reference) => resolved.push(reference),
                Err(source) => {
                    return Err(self.fail(PipelineError::Reference {
                        index: node.index(),
                        href: node.href().to_string(),
                        source,
                    }))
                }
            }
        }

        self.transition(PipelineState::Rewritten)?;
        Ok(resolved)
    }

    /// Write a rewritten document into `output_directory`
    ///
    /// # Errors
    /// - [`PipelineError::IllegalTransition`] unless the last pass ended in `Rewritten`
    /// - [`PipelineError::Serialization`] if writing fails
    pub fn serialize(&mut self, document: &MapDocument, output_directory: &Path) -> PipelineResult<PathBuf> {
        validate_transition(self.state, PipelineState::Serialized)?;
        match document.write_to_dir(output_directory) {
            Ok(path) => {
                self.transition(PipelineState::Serialized)?;
                Ok(path)
            }
            Err(e) => Err(self.fail(PipelineError::Serialization(e))),
        }
    }

    /// Parse and select every reference without fetching or writing
    ///
    /// # Errors
    /// See [`plan_references`]
    pub fn plan(&self, document: &MapDocument) -> PipelineResult<Vec<PlannedReference>> {
        plan_references(&self.selector, &self.scanner, document)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(index = node.index(), href = node.href()))]
    fn resolve_one(&self, node: &TopicRef) -> Result<ResolvedReference, ReferenceError> {
        let coordinate = ArtifactCoordinate::parse(node.href())?;
        let request = self.selector.select(&coordinate)?;
        request.prepare_destination()?;

        let path = fetch(&self.fetcher, &request)?.into_verified()?;
        let digest = ContentHash::compute_file(&path)
            .map_err(|e| ditastore_resolve::ResolveError::from(FetchError::io_error(&path, e)))?;

        tracing::debug!(path = %path.display(), digest = %digest.short(), "Resolved reference");
        Ok(ResolvedReference {
            href: node.href().to_string(),
            strategy: request.strategy(),
            path,
            digest,
        })
    }

    fn transition(&mut self, to: PipelineState) -> PipelineResult<()> {
        validate_transition(self.state, to)?;
        self.state = to;
        self.trace.push(to);
        Ok(())
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        tracing::error!(state = ?self.state, kind = %error.kind(), error = %error, "Pipeline failed");
        self.state = PipelineState::Failed;
        self.trace.push(PipelineState::Failed);
        error
    }
}

impl RewriteOrchestrator<ditastore_resolve::MavenRepository> {
    /// Orchestrator wired from configuration
    ///
    /// # Errors
    /// [`PipelineError::Config`] if the configuration is invalid
    pub fn from_config(config: &PullTopicsConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self::new(config.repository()?, config.selector()?, config.scanner()))
    }
}

/// Run a complete pass for a configuration
///
/// # Errors
/// Any [`PipelineError`]
pub fn pull_topics(config: &PullTopicsConfig) -> PipelineResult<RewriteReport> {
    RewriteOrchestrator::from_config(config)?.run(&config.map_file, &config.output_directory)
}

/// Plan a pass for a configuration without touching the repository
///
/// # Errors
/// Any [`PipelineError`] except fetch and serialization failures
pub fn plan_topics(config: &PullTopicsConfig) -> PipelineResult<Vec<PlannedReference>> {
    config.validate()?;
    let document = MapDocument::load(&config.map_file).map_err(PipelineError::Load)?;
    plan_references(&config.selector()?, &config.scanner(), &document)
}

/// Parse and select every reference in `document` without fetching
///
/// # Errors
/// [`PipelineError::Reference`] for the first reference that cannot be planned
pub fn plan_references(
    selector: &StrategySelector,
    scanner: &ReferenceScanner,
    document: &MapDocument,
) -> PipelineResult<Vec<PlannedReference>> {
    let nodes = scanner.scan(document).map_err(PipelineError::Load)?;
    nodes
        .iter()
        .map(|node| {
            let planned = ArtifactCoordinate::parse(node.href())
                .map_err(ReferenceError::from)
                .and_then(|c| selector.select(&c).map_err(ReferenceError::from));
            match planned {
                Ok(request) => Ok(PlannedReference {
                    href: node.href().to_string(),
                    strategy: request.strategy(),
                    expected_path: request.expected_path().to_path_buf(),
                }),
                Err(source) => Err(PipelineError::Reference {
                    index: node.index(),
                    href: node.href().to_string(),
                    source,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ditastore_test_utils::{map_with_hrefs, FetchCall, RecordingFetcher};
    use pretty_assertions::assert_eq;
    use super::PipelineState::{Failed, Loaded, Resolving, Rewritten, Scanning, Serialized};

    fn orchestrator(fetcher: RecordingFetcher, topics: &Path) -> RewriteOrchestrator<RecordingFetcher> {
        RewriteOrchestrator::new(fetcher, StrategySelector::new(topics), ReferenceScanner::default())
    }

    #[test]
    fn transition_table() {
        assert!(validate_transition(Loaded, Scanning).is_ok());
        assert!(validate_transition(Scanning, Rewritten).is_ok());
        assert!(validate_transition(Resolving(2), Resolving(3)).is_ok());
        assert!(validate_transition(Resolving(2), Failed).is_ok());
        assert!(validate_transition(Rewritten, Serialized).is_ok());

        assert!(validate_transition(Loaded, Rewritten).is_err());
        assert!(validate_transition(Resolving(2), Resolving(4)).is_err());
        assert!(validate_transition(Serialized, Failed).is_err());
        assert!(validate_transition(Failed, Loaded).is_err());
    }

    #[test]
    fn rewrites_both_strategies() {
        let dir = tempfile::tempdir().unwrap();
        let topics = dir.path().join("topics");
        let mut doc = MapDocument::from_text(
            "m.ditamap",
            map_with_hrefs(&["m2:com.acme:guide:1.0:dita", "m2:com.acme:bundle:2.3::zip:docs/page1.dita"]),
        )
        .unwrap();

        let mut orch = orchestrator(RecordingFetcher::new(), &topics);
        let resolved = orch.rewrite(&mut doc).unwrap();

        assert_eq!(
            resolved.iter().map(|r| r.path.clone()).collect::<Vec<_>>(),
            vec![topics.join("com.acme/guide.dita"), topics.join("docs/page1.dita")]
        );
        assert_eq!(resolved[1].strategy, ResolutionStrategy::ExtractMember);
        assert_eq!(orch.trace(), [Loaded, Scanning, Resolving(0), Resolving(1), Rewritten]);

        let json = serde_json::to_value(&resolved[0]).unwrap();
        assert_eq!(json["strategy"], "retrieve-whole");
        assert_eq!(json["digest"].as_str().unwrap().len(), 64);

        let rendered = doc.render();
        assert!(rendered.contains(&format!("href=\"{}\"", topics.join("com.acme/guide.dita").display())));
        assert!(!rendered.contains("m2:"));
    }

    #[test]
    fn stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = MapDocument::from_text(
            "m.ditamap",
            map_with_hrefs(&["m2:g:a:1:dita", "m2:g:b:1:dita", "m2:g:c:1:dita"]),
        )
        .unwrap();

        let mut orch = orchestrator(RecordingFetcher::new().fail_on(2), dir.path());
        let err = orch.rewrite(&mut doc).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FetchFailure);
        assert_eq!(err.href(), Some("m2:g:b:1:dita"));
        assert_eq!(orch.fetcher().call_count(), 2);
        assert_eq!(orch.state(), Failed);
        assert_eq!(orch.trace(), [Loaded, Scanning, Resolving(0), Resolving(1), Failed]);

        let out = dir.path().join("out");
        assert!(matches!(
            orch.serialize(&doc, &out),
            Err(PipelineError::IllegalTransition { .. })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn missing_file_after_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = MapDocument::from_text("m.ditamap", map_with_hrefs(&["m2:g:a:1:dita"])).unwrap();

        let mut orch = orchestrator(RecordingFetcher::new().skip_writes(), dir.path());
        let err = orch.rewrite(&mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolvedFileMissing);
    }

    #[test]
    fn parse_errors_fail_without_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = MapDocument::from_text("m.ditamap", map_with_hrefs(&["m2:g:a"])).unwrap();

        let mut orch = orchestrator(RecordingFetcher::new(), dir.path());
        let err = orch.rewrite(&mut doc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReference);
        assert_eq!(orch.fetcher().call_count(), 0);
    }

    #[test]
    fn inconsistent_reference_is_invariant_violation() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = MapDocument::from_text("m.ditamap", map_with_hrefs(&["m2:g:a:1::zip"])).unwrap();

        let mut orch = orchestrator(RecordingFetcher::new(), dir.path());
        assert_eq!(orch.rewrite(&mut doc).unwrap_err().kind(), ErrorKind::InvariantViolation);
    }

    #[test]
    fn no_references_goes_straight_to_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let text = map_with_hrefs(&["local/intro.dita"]);
        let mut doc = MapDocument::from_text("m.ditamap", text.clone()).unwrap();

        let mut orch = orchestrator(RecordingFetcher::new(), dir.path());
        assert!(orch.rewrite(&mut doc).unwrap().is_empty());
        assert_eq!(orch.trace(), [Loaded, Scanning, Rewritten]);

        let written = orch.serialize(&doc, &dir.path().join("out")).unwrap();
        assert_eq!(std::fs::read_to_string(written).unwrap(), text);
        assert_eq!(orch.state(), Serialized);
    }

    #[test]
    fn plan_does_not_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let doc = MapDocument::from_text(
            "m.ditamap",
            map_with_hrefs(&["m2:com.acme:guide:1.0:dita", "m2:com.acme:bundle:2.3::zip:docs/page1.dita"]),
        )
        .unwrap();

        let orch = orchestrator(RecordingFetcher::new(), Path::new("/out/topics"));
        let plan = orch.plan(&doc).unwrap();

        assert_eq!(plan[0].expected_path, PathBuf::from("/out/topics/com.acme/guide.dita"));
        assert_eq!(plan[1].expected_path, PathBuf::from("/out/topics/docs/page1.dita"));
        assert_eq!(orch.fetcher().calls(), Vec::<FetchCall>::new());
        assert!(!dir.path().join("topics").exists());
    }

    #[test]
    fn plan_references_reports_bad_reference() {
        let doc = MapDocument::from_text(
            "m.ditamap",
            map_with_hrefs(&["m2:com.acme:guide:1.0:dita", "m2:g:a:1::zip:../../etc/passwd"]),
        )
        .unwrap();

        let err = plan_references(&StrategySelector::new("/out/topics"), &ReferenceScanner::default(), &doc)
            .unwrap_err();
        assert_eq!(err.href(), Some("m2:g:a:1::zip:../../etc/passwd"));
        assert!(matches!(err, PipelineError::Reference { index: 1, .. }));
    }

    #[test]
    fn run_reports_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut orch = orchestrator(RecordingFetcher::new(), dir.path());
        let err = orch.run(&dir.path().join("missing.ditamap"), dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(orch.state(), Failed);
    }
}
