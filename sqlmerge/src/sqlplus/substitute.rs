//! SQL*Plus DEFINE / UNDEFINE processing and `&name` substitution.

use super::define_table::DefineTable;
use crate::errors::{MergeError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::{debug, info};

#[allow(clippy::expect_used)]
static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^define\s+(\w+)\s*=\s*(?:'(.*?)'|([^\s;]+))\s*;?\s*$")
        .expect("DEFINE pattern is valid")
});

#[allow(clippy::expect_used)]
static EMPTY_DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^define\s+\w+\s*=\s*;?\s*$").expect("empty DEFINE pattern is valid")
});

#[allow(clippy::expect_used)]
static UNDEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^undefine\s+(\w+)\s*;\s*$").expect("UNDEFINE pattern is valid")
});

#[allow(clippy::expect_used)]
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(\w+)(\.\.)?").expect("reference pattern is valid"));

/// Per-variable substitution counters, in first-definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementStats {
    counts: Vec<(String, usize)>,
}

impl ReplacementStats {
    fn record_define(&mut self, name: &str) {
        if !self.counts.iter().any(|(n, _)| n == name) {
            self.counts.push((name.to_string(), 0));
        }
    }

    fn increment(&mut self, name: &str) {
        match self.counts.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((name.to_string(), 1)),
        }
    }

    /// Number of substitutions performed for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    /// Total substitutions across all variables.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Iterates `(name, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(n, c)| (n.as_str(), *c))
    }

    /// Returns true if no variable was ever defined or substituted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Converts the counters to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(n, c)| (n.to_string(), Value::from(c)))
            .collect();
        Value::Object(map)
    }

    /// Renders the aligned summary table.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let width = self.counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        self.iter()
            .map(|(name, count)| format!("{name:<width$}\t{count}"))
            .collect()
    }
}

/// Result of a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Text with statements removed and references replaced.
    pub content: String,
    /// Definitions still active at the end of the text.
    pub defines: DefineTable,
    /// How often each variable was substituted.
    pub replacements: ReplacementStats,
}

/// Single forward pass over a script applying SQL*Plus variable semantics.
///
/// Per line, in order:
/// 1. `--` comments pass through untouched.
/// 2. `DEFINE name = 'value'` / `DEFINE name = value` sets a variable and is dropped.
/// 3. `UNDEFINE name;` removes a variable and is dropped.
/// 4. Anything else has each `&name` replaced by its current value, and
///    `&name..` by the value followed by a single `.`.
///
/// A reference to a name with no earlier DEFINE is an error; later
/// definitions never satisfy earlier uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableSubstitutor;

impl VariableSubstitutor {
    /// Creates a substitutor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Processes `text`.
    ///
    /// A line that starts with `DEFINE ` but does not parse as a definition
    /// is logged and then treated as ordinary text, so its references are
    /// still substituted.
    ///
    /// # Errors
    ///
    /// - [`MergeError::UndefinedVariable`] for a reference with no prior DEFINE.
    /// - [`MergeError::MalformedDefine`] for `DEFINE name =` with no value.
    pub fn substitute(&self, text: &str) -> Result<Substitution> {
        let mut defines = DefineTable::new();
        let mut replacements = ReplacementStats::default();
        let mut lines = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let clean = line.trim_end();
            let trimmed = clean.trim_start();

            if trimmed.starts_with("--") {
                lines.push(line.to_string());
                continue;
            }

            if starts_with_keyword(trimmed, "DEFINE ") {
                if let Some(caps) = DEFINE_RE.captures(trimmed) {
                    let name = &caps[1];
                    let value = caps
                        .get(2)
                        .or_else(|| caps.get(3))
                        .ok_or_else(|| MergeError::MalformedDefine {
                            line: line_number,
                            text: trimmed.to_string(),
                        })?
                        .as_str();

                    debug!(line = line_number, name, value, "Defining variable");
                    defines.define(name, value);
                    replacements.record_define(name);
                    continue;
                }
                if EMPTY_DEFINE_RE.is_match(trimmed) {
                    return Err(MergeError::MalformedDefine {
                        line: line_number,
                        text: trimmed.to_string(),
                    });
                }
                debug!(line = line_number, text = trimmed, "Ignoring DEFINE with invalid syntax");
            }

            if let Some(caps) = UNDEFINE_RE.captures(trimmed) {
                let name = &caps[1];
                defines.undefine(name);
                debug!(line = line_number, name, "Undefining variable");
                continue;
            }

            lines.push(substitute_line(clean, line_number, &defines, &mut replacements)?);
        }

        log_summary(&replacements);

        Ok(Substitution {
            content: lines.join("\n"),
            defines,
            replacements,
        })
    }
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

fn substitute_line(
    line: &str,
    line_number: usize,
    defines: &DefineTable,
    replacements: &mut ReplacementStats,
) -> Result<String> {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;

    for caps in REFERENCE_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps[1];
        let value = defines
            .get(name)
            .ok_or_else(|| MergeError::UndefinedVariable {
                name: name.to_string(),
                line: line_number,
            })?;

        out.push_str(&line[last..whole.start()]);
        out.push_str(value);
        if caps.get(2).is_some() {
            out.push('.');
        }
        last = whole.end();

        debug!(line = line_number, name, value, "Substituting variable");
        replacements.increment(name);
    }

    out.push_str(&line[last..]);
    Ok(out)
}

fn log_summary(replacements: &ReplacementStats) {
    info!("Substitution summary:");
    if replacements.is_empty() {
        info!("No variable substitutions performed.");
        return;
    }
    for line in replacements.summary_lines() {
        info!("{line}");
    }
}
