//! Turning search hits into usages
//!
//! A [`TargetDescriptor`] names what was searched for. Hits are converted into
//! [`SourceUsage`]s, classified for read/write access when every primary target
//! is a variable, then passed through an explicit chain of converters.

use serde::Serialize;

use crate::core::model::LineHit;
use crate::core::util::truncate_string;
use crate::error::{Result, SearchError};
use crate::usages::access::{analyze_reference, is_setter_of, resolve_access};
use crate::usages::source::SourceUsage;

/// What kind of program element a target is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Variable,
    Function,
    Type,
    #[default]
    Text,
}

impl std::str::FromStr for TargetKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "variable" | "var" | "field" => Ok(TargetKind::Variable),
            "function" | "fn" | "method" => Ok(TargetKind::Function),
            "type" | "class" => Ok(TargetKind::Type),
            "text" => Ok(TargetKind::Text),
            _ => Err(SearchError::UnknownTargetKind(s.to_string())),
        }
    }
}

/// One searched-for element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTarget {
    pub name: String,
    pub kind: TargetKind,
}

impl SearchTarget {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The targets a search was run for.
///
/// Primary targets are what the user asked about. Additional targets are found
/// along with them (e.g. accessors of a field) and their usages count as usages
/// of the primary targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    primary: Vec<SearchTarget>,
    additional: Vec<SearchTarget>,
}

impl TargetDescriptor {
    pub fn new(primary: Vec<SearchTarget>) -> Result<Self> {
        Self::with_additional(primary, Vec::new())
    }

    pub fn with_additional(primary: Vec<SearchTarget>, additional: Vec<SearchTarget>) -> Result<Self> {
        if primary.is_empty() {
            return Err(SearchError::EmptyTargets);
        }
        Ok(Self {
            primary,
            additional,
        })
    }

    pub fn primary(&self) -> &[SearchTarget] {
        &self.primary
    }

    pub fn additional(&self) -> &[SearchTarget] {
        &self.additional
    }

    pub fn all(&self) -> impl Iterator<Item = &SearchTarget> {
        self.primary.iter().chain(self.additional.iter())
    }

    /// Whether usages should be classified by read/write access
    pub fn is_read_write_accessible(&self) -> bool {
        self.primary.iter().all(|t| t.kind == TargetKind::Variable)
    }

    /// Whole-word regex matching any target name
    pub fn pattern(&self) -> String {
        let names: Vec<String> = self.all().map(|t| regex::escape(&t.name)).collect();
        format!(r"\b(?:{})\b", names.join("|"))
    }

    /// Variable whose access a hit on `target` describes: the target itself, or
    /// the primary variable it is a setter of.
    fn variable_for<'a>(&'a self, target: &'a SearchTarget) -> Option<&'a str> {
        if target.kind == TargetKind::Variable {
            return Some(target.name.as_str());
        }
        self.primary
            .iter()
            .find(|p| p.kind == TargetKind::Variable && is_setter_of(&target.name, &p.name))
            .map(|p| p.name.as_str())
    }

    pub(crate) fn find(&self, name: &str) -> Option<&SearchTarget> {
        self.all().find(|t| t.name == name)
    }
}

/// Post-processing step applied to every converted usage
pub trait UsageConverter {
    fn convert(&self, usage: SourceUsage) -> SourceUsage;
}

/// Truncates long lines to a byte budget
#[derive(Debug, Clone, Copy)]
pub struct ExcerptLimit(pub usize);

impl UsageConverter for ExcerptLimit {
    fn convert(&self, mut usage: SourceUsage) -> SourceUsage {
        let (text, truncated) = truncate_string(&usage.text, self.0);
        if truncated {
            usage.text = format!("{text}…");
        }
        usage
    }
}

/// Converts hits for one descriptor, then runs the converter chain in order
pub struct Classifier {
    descriptor: TargetDescriptor,
    converters: Vec<Box<dyn UsageConverter>>,
}

impl Classifier {
    pub fn new(descriptor: TargetDescriptor) -> Self {
        Self {
            descriptor,
            converters: Vec::new(),
        }
    }

    pub fn with_converter(mut self, converter: impl UsageConverter + 'static) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    pub fn descriptor(&self) -> &TargetDescriptor {
        &self.descriptor
    }

    pub fn convert(&self, hit: &LineHit) -> SourceUsage {
        let usage = convert(&self.descriptor, hit);
        self.converters
            .iter()
            .fold(usage, |usage, converter| converter.convert(usage))
    }

    pub fn convert_all(&self, hits: &[LineHit]) -> Vec<SourceUsage> {
        hits.iter().map(|hit| self.convert(hit)).collect()
    }
}

/// Build the usage for one hit.
///
/// # Panics
///
/// When the matched text names no target of `descriptor`: hits must come from
/// a search for exactly these targets.
pub fn convert(descriptor: &TargetDescriptor, hit: &LineHit) -> SourceUsage {
    let matched = hit.matched();
    let target = descriptor.find(matched).unwrap_or_else(|| {
        panic!(
            "hit {}:{} matched {matched:?}, which is not a search target",
            hit.path, hit.line
        )
    });

    let access = if descriptor.is_read_write_accessible() {
        descriptor
            .variable_for(target)
            .and_then(|name| analyze_reference(&hit.text, hit.span.start, hit.span.end, name))
            .map(resolve_access)
    } else {
        None
    };

    SourceUsage {
        path: hit.path.clone(),
        abs_path: hit.abs_path.clone(),
        line: hit.line,
        text: hit.text.clone(),
        spans: vec![hit.span],
        access,
    }
}
