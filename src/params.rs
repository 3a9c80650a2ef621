//! Parameter state and the XML parameter store.
//!
//! The store keeps the simulator's input document as text and exposes one
//! typed slot per parameter. A slot may be backed by several elements with
//! the same tag: reads take the last one, writes broadcast to all of them.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{CalibrationError, Result, StoreError};

/// The calibratable configuration. λ and μ are non-negative in the canonical
/// store; gravity is only present when the input file carries it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterState {
    pub lambda: f64,
    pub mu: f64,
    pub gravity: Option<f64>,
}

impl ParameterState {
    pub fn new(lambda: f64, mu: f64) -> Self {
        Self { lambda, mu, gravity: None }
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }
}

/// Renders as a bracketed list, `[λ, μ]` or `[λ, μ, g]`.
impl fmt::Display for ParameterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gravity {
            Some(g) => write!(f, "[{:?}, {:?}, {:?}]", self.lambda, self.mu, g),
            None => write!(f, "[{:?}, {:?}]", self.lambda, self.mu),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    Lambda,
    Mu,
    Gravity,
}

impl Param {
    pub fn tag(self) -> &'static str {
        match self {
            Param::Lambda => "lambda",
            Param::Mu => "mu",
            Param::Gravity => "gravity",
        }
    }
}

const OUTPUT_PREFIX_TAG: &str = "OutputPathAndPrefix";

/// In-memory copy of the simulator's XML input file.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterStore {
    text: String,
}

impl ParameterStore {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CalibrationError::StoreIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { text })
    }

    /// Rewrites the whole document to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.text).map_err(|source| CalibrationError::StoreIo {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn as_text(&self) -> &str {
        &self.text
    }

    /// Value of the last `<tag>` element, or `None` if there is none.
    pub fn get(&self, param: Param) -> std::result::Result<Option<f64>, StoreError> {
        let tag = param.tag();
        let spans = element_spans(&self.text, tag)?;
        let Some(last) = spans.last() else {
            return Ok(None);
        };
        let raw = self.text[last.clone()].trim();
        raw.parse::<f64>()
            .map(Some)
            .map_err(|_| StoreError::InvalidValue { tag, text: raw.to_string() })
    }

    /// Writes `value` into every `<tag>` element. Returns how many were updated.
    pub fn set(&mut self, param: Param, value: f64) -> std::result::Result<usize, StoreError> {
        self.replace_all(param.tag(), &format!("{value:?}"))
    }

    pub fn output_prefix(&self) -> std::result::Result<Option<String>, StoreError> {
        let spans = element_spans(&self.text, OUTPUT_PREFIX_TAG)?;
        Ok(spans.last().map(|r| self.text[r.clone()].trim().to_string()))
    }

    pub fn set_output_prefix(&mut self, prefix: &str) -> std::result::Result<usize, StoreError> {
        self.replace_all(OUTPUT_PREFIX_TAG, prefix)
    }

    /// Reads λ, μ and (optionally) gravity.
    pub fn state(&self) -> std::result::Result<ParameterState, StoreError> {
        let lambda = self
            .get(Param::Lambda)?
            .ok_or(StoreError::MissingField(Param::Lambda.tag()))?;
        let mu = self
            .get(Param::Mu)?
            .ok_or(StoreError::MissingField(Param::Mu.tag()))?;
        let gravity = self.get(Param::Gravity)?;
        Ok(ParameterState { lambda, mu, gravity })
    }

    /// Overwrites λ and μ (and gravity, when the state carries one).
    pub fn apply(&mut self, state: &ParameterState) -> std::result::Result<(), StoreError> {
        if self.set(Param::Lambda, state.lambda)? == 0 {
            return Err(StoreError::MissingField(Param::Lambda.tag()));
        }
        if self.set(Param::Mu, state.mu)? == 0 {
            return Err(StoreError::MissingField(Param::Mu.tag()));
        }
        if let Some(g) = state.gravity {
            self.set(Param::Gravity, g)?;
        }
        Ok(())
    }

    fn replace_all(&mut self, tag: &'static str, value: &str) -> std::result::Result<usize, StoreError> {
        let spans = element_spans(&self.text, tag)?;
        // back to front so earlier offsets stay valid
        for span in spans.iter().rev() {
            self.text.replace_range(span.clone(), value);
        }
        Ok(spans.len())
    }
}

/// `<stem>_TestAction<index>.<ext>` next to the canonical store.
pub fn candidate_path(store_path: &Path, index: usize) -> PathBuf {
    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match store_path.extension() {
        Some(ext) => format!("{stem}_TestAction{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}_TestAction{index}"),
    };
    store_path.with_file_name(name)
}

/// Derives a new simulator input from `template` with λ, μ and (optionally)
/// the output prefix replaced, and writes it to `output`.
pub fn setup(
    template: &Path,
    output: &Path,
    lambda: f64,
    mu: f64,
    output_prefix: Option<&str>,
) -> Result<ParameterState> {
    let mut store = ParameterStore::read(template)?;
    if let Some(prefix) = output_prefix {
        store.set_output_prefix(prefix)?;
    }
    let mut state = store.state()?;
    state.lambda = lambda;
    state.mu = mu;
    store.apply(&state)?;
    store.write(output)?;
    Ok(state)
}

/// Sections whose content is not markup.
const OPAQUE: [(&str, &str); 2] = [("<!--", "-->"), ("<![CDATA[", "]]>")];

/// Byte ranges of the text content of every `<tag ...>...</tag>` element.
/// Self-closing elements and anything inside comments or CDATA are skipped.
fn element_spans(text: &str, tag: &'static str) -> std::result::Result<Vec<Range<usize>>, StoreError> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = text[cursor..].find(&open) {
        let start = cursor + rel;
        let opaque = OPAQUE
            .iter()
            .filter_map(|&(begin, end)| text[cursor..start].find(begin).map(|i| (cursor + i, end)))
            .min_by_key(|&(at, _)| at);
        if let Some((at, end)) = opaque {
            // an unterminated comment hides the rest of the document
            let Some(len) = text[at..].find(end) else { break };
            cursor = at + len + end.len();
            continue;
        }
        let after_name = start + open.len();
        // `<mu` must not match `<mux>`
        match text[after_name..].chars().next() {
            Some('>') | Some('/') => {}
            Some(c) if c.is_whitespace() => {}
            _ => {
                cursor = after_name;
                continue;
            }
        }
        let Some(gt) = text[after_name..].find('>') else {
            return Err(StoreError::UnterminatedElement(tag));
        };
        let content_start = after_name + gt + 1;
        if text[..content_start].ends_with("/>") {
            cursor = content_start;
            continue;
        }
        let Some(end_rel) = text[content_start..].find(&close) else {
            return Err(StoreError::UnterminatedElement(tag));
        };
        let content_end = content_start + end_rel;
        spans.push(content_start..content_end);
        cursor = content_end + close.len();
    }
    Ok(spans)
}
