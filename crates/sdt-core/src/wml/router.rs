//! Splits a batch by physical part and runs each part's injection.
//!
//! The body is processed first and must succeed. Header and footer parts are
//! optional: a missing part is skipped and a failing part is recorded in the
//! report without touching the others.

use super::config::SdtConfig;
use super::identity::{Fingerprint, FingerprintCache};
use super::locator::{Locator, MatchKind, RootContext, Target};
use super::registry::ProcessedRegistry;
use super::scheduler::order_by_depth;
use super::settings::InjectionSettings;
use super::wrapper::{wrap, WrapFlavor};
use crate::error::{Result, SdtError};
use crate::model::{ContentElement, ElementKind, PartTarget};
use crate::package::OoxmlPackage;
use crate::util::TextNormalizer;
use crate::xml::XmlDocument;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// One unit of work: wrap `element` in a control configured by `config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPair {
    pub element: ContentElement,
    pub config: SdtConfig,
}

impl InjectionPair {
    pub fn new(element: impl Into<ContentElement>, config: SdtConfig) -> Self {
        Self {
            element: element.into(),
            config,
        }
    }
}

/// A validated pair with its lookup data.
#[derive(Debug, Clone)]
pub struct PlannedPair<'a> {
    /// Position in the caller's batch.
    pub pair: usize,
    pub element: &'a ContentElement,
    pub config: &'a SdtConfig,
    pub fingerprint: Fingerprint,
    /// Earlier pairs in the same part with the same fingerprint and the
    /// same `inline_level` scoping.
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartReport {
    pub part: PartTarget,
    pub wrapped: usize,
    /// Wraps that used the positional fallback.
    pub fallbacks: usize,
}

#[derive(Debug, Serialize)]
pub struct PartFailure {
    pub part: PartTarget,
    #[serde(serialize_with = "error_as_string")]
    pub error: SdtError,
}

fn error_as_string<S: Serializer>(error: &SdtError, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[derive(Debug, Default, Serialize)]
pub struct InjectionReport {
    pub parts: Vec<PartReport>,
    /// Optional parts that were targeted but are absent from the package.
    pub skipped_parts: Vec<PartTarget>,
    pub failed_parts: Vec<PartFailure>,
    /// Pairs dropped as exact repeats of an earlier pair.
    pub deduplicated: usize,
}

impl InjectionReport {
    pub fn wrapped_total(&self) -> usize {
        self.parts.iter().map(|p| p.wrapped).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_parts.is_empty() && self.skipped_parts.is_empty()
    }
}

/// Validate the whole batch before anything is mutated.
///
/// Returns the pairs to process in batch order, and how many exact repeats
/// were dropped.
pub fn plan_batch<'a>(
    batch: &'a [InjectionPair],
    normalizer: &TextNormalizer,
    cache: &mut FingerprintCache,
) -> Result<(Vec<PlannedPair<'a>>, usize)> {
    let mut seen_ids: HashMap<u32, usize> = HashMap::new();
    let mut planned = Vec::with_capacity(batch.len());
    let mut deduplicated = 0;

    for (pair, entry) in batch.iter().enumerate() {
        let InjectionPair { element, config } = entry;

        if config.run_level() && !element.is_run_eligible() {
            return Err(SdtError::InvalidConfig {
                pair,
                reason: format!(
                    "run_level applies to paragraphs and runs, not to a {}",
                    element.kind()
                ),
            });
        }

        if let Some(&first) = seen_ids.get(&config.id()) {
            if batch[first] == *entry {
                debug!(pair, first, id = config.id(), "duplicate registration ignored");
                deduplicated += 1;
                continue;
            }
            return Err(SdtError::InvalidConfig {
                pair,
                reason: format!("id {} is already used by pair #{first}", config.id()),
            });
        }
        seen_ids.insert(config.id(), pair);

        planned.push(PlannedPair {
            pair,
            element,
            config,
            fingerprint: cache.get(element, normalizer),
            index: 0,
        });
    }
    Ok((planned, deduplicated))
}

/// Group planned pairs by part, body first, and number pairs sharing a
/// fingerprint and a search scope within each part.
fn split_by_part(planned: Vec<PlannedPair<'_>>) -> BTreeMap<PartTarget, Vec<PlannedPair<'_>>> {
    let mut parts: BTreeMap<PartTarget, Vec<PlannedPair<'_>>> = BTreeMap::new();
    for p in planned {
        parts.entry(p.element.part()).or_default().push(p);
    }
    for pairs in parts.values_mut() {
        let mut seen: HashMap<(Fingerprint, bool), usize> = HashMap::new();
        for p in pairs.iter_mut() {
            let count = seen
                .entry((p.fingerprint.clone(), p.config.inline_level()))
                .or_default();
            p.index = *count;
            *count += 1;
        }
    }
    parts
}

/// Headers and footers present in `package`, in part order.
pub fn available_parts(package: &OoxmlPackage) -> Vec<PartTarget> {
    package
        .part_names()
        .filter_map(PartTarget::from_part_path)
        .filter(|p| !p.is_required())
        .collect()
}

/// Wrap every pair of one part in depth order.
pub fn inject_part(
    doc: &mut XmlDocument,
    part: PartTarget,
    pairs: &[PlannedPair<'_>],
    settings: &InjectionSettings,
) -> Result<PartReport> {
    let part_path = part.part_path();
    let mut locator = Locator::new(
        RootContext::for_part(part),
        settings.fallback,
        TextNormalizer::new(settings.normalize_unicode),
    );
    if locator.root(doc).is_none() {
        return Err(SdtError::InvalidPackage {
            message: format!(
                "{part_path} has no w:{} element",
                locator.root_context().local_name()
            ),
        });
    }

    let mut registry = ProcessedRegistry::new();
    let mut report = PartReport {
        part,
        wrapped: 0,
        fallbacks: 0,
    };

    for i in order_by_depth(pairs.iter().map(|p| (p.element, p.config))) {
        let p = &pairs[i];
        let target = Target {
            element: p.element,
            fingerprint: &p.fingerprint,
            index: p.index,
            run_level: p.config.run_level(),
            inline_level: p.config.inline_level(),
        };

        let located = locator
            .locate(doc, &registry, &target)
            .ok_or_else(|| SdtError::LookupFailed {
                pair: p.pair,
                kind: p.element.kind().to_string(),
                label: p.config.describe(),
                part: part_path.clone(),
            })?;

        match located.matched {
            // A run-level paragraph stays visible; only its run moves.
            MatchKind::Fingerprint if p.config.run_level() && p.element.kind() != ElementKind::Run => {}
            MatchKind::Fingerprint => {
                registry.record_match(&p.fingerprint, p.config.inline_level(), p.index)
            }
            MatchKind::Fallback => {
                warn!(
                    part = %part,
                    pair = p.pair,
                    kind = %p.element.kind(),
                    label = %p.element.label(),
                    "no fingerprint match, using first unprocessed node"
                );
                report.fallbacks += 1;
            }
        }

        let flavor = WrapFlavor::for_config(p.config);
        wrap(doc, &mut registry, located.node, p.config, flavor)?;
        report.wrapped += 1;
        debug!(
            part = %part,
            pair = p.pair,
            kind = %p.element.kind(),
            %flavor,
            path = %doc.path(located.node),
            "wrapped"
        );
    }

    info!(
        part = %part,
        wrapped = report.wrapped,
        fallbacks = report.fallbacks,
        "part injected"
    );
    Ok(report)
}

fn process_part(
    package: &mut OoxmlPackage,
    part: PartTarget,
    pairs: &[PlannedPair<'_>],
    settings: &InjectionSettings,
) -> Result<PartReport> {
    let path = part.part_path();
    let mut doc = package.get_xml_part(&path)?;
    let report = inject_part(&mut doc, part, pairs, settings)?;
    package.put_xml_part(&path, &doc)?;
    Ok(report)
}

/// Inject a whole batch into `package`.
pub fn inject_package(
    package: &mut OoxmlPackage,
    batch: &[InjectionPair],
    settings: &InjectionSettings,
) -> Result<InjectionReport> {
    let normalizer = TextNormalizer::new(settings.normalize_unicode);
    let mut cache = FingerprintCache::new();
    let (planned, deduplicated) = plan_batch(batch, &normalizer, &mut cache)?;

    let body_path = PartTarget::Body.part_path();
    if !package.has_part(&body_path) {
        return Err(SdtError::MissingPart {
            part_path: body_path,
            document_type: "Word".to_string(),
        });
    }

    let mut report = InjectionReport {
        deduplicated,
        ..Default::default()
    };

    for (part, pairs) in split_by_part(planned) {
        if part.is_required() {
            report.parts.push(process_part(package, part, &pairs, settings)?);
            continue;
        }

        if !package.has_part(&part.part_path()) {
            debug!(part = %part, pairs = pairs.len(), "part not in package, skipping");
            report.skipped_parts.push(part);
            continue;
        }

        match process_part(package, part, &pairs, settings) {
            Ok(part_report) => report.parts.push(part_report),
            Err(error) => {
                warn!(part = %part, %error, "optional part failed");
                report.failed_parts.push(PartFailure { part, error });
            }
        }
    }

    Ok(report)
}
