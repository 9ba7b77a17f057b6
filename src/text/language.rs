//! Per-language phrase tables.
//!
//! A language is pure data: the nested phrase tree, a few meta flags and a set
//! of grammar rules. Adding a language means adding a JSON file here and an
//! entry in [`BUILTIN`], never new branching logic.

use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::error::TextError;

/// Codes of the languages compiled into the crate.
pub const BUILTIN: &[&str] = &["en", "fr"];

fn builtin_source(code: &str) -> Option<&'static str> {
    match code {
        "en" => Some(include_str!("languages/en.json")),
        "fr" => Some(include_str!("languages/fr.json")),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Meta {
    capitalize_first_letter: bool,
    regex_flags: String,
}

#[derive(Debug, Deserialize)]
struct LanguageFile {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    grammar: HashMap<String, Vec<(String, String)>>,
    v5: Value,
}

/// Find/replace rule applied to a token value.
struct GrammarRule {
    pattern: Regex,
    replacement: String,
}

/// A loaded phrase table.
pub struct Language {
    code: String,
    capitalize_first_letter: bool,
    phrases: Value,
    grammar: HashMap<String, Vec<GrammarRule>>,
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("code", &self.code)
            .field("capitalize_first_letter", &self.capitalize_first_letter)
            .field("grammar", &self.grammar.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Language {
    /// Loads one of the [`BUILTIN`] languages.
    pub fn builtin(code: &str) -> Result<Self, TextError> {
        let source =
            builtin_source(code).ok_or_else(|| TextError::UnknownLanguage(code.to_string()))?;
        Self::from_json(code, source)
    }

    /// Loads a language table from its JSON source.
    pub fn from_json(code: &str, source: &str) -> Result<Self, TextError> {
        let invalid = |message: String| TextError::InvalidLanguage {
            language: code.to_string(),
            message,
        };

        let file: LanguageFile =
            serde_json::from_str(source).map_err(|err| invalid(err.to_string()))?;
        let case_insensitive = file.meta.regex_flags.contains('i');

        let mut grammar = HashMap::with_capacity(file.grammar.len());
        for (name, rules) in file.grammar {
            let compiled = rules
                .into_iter()
                .map(|(pattern, replacement)| {
                    RegexBuilder::new(&pattern)
                        .case_insensitive(case_insensitive)
                        .build()
                        .map(|pattern| GrammarRule {
                            pattern,
                            replacement,
                        })
                        .map_err(|err| invalid(err.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            grammar.insert(name, compiled);
        }

        Ok(Self {
            code: code.to_string(),
            capitalize_first_letter: file.meta.capitalize_first_letter,
            phrases: file.v5,
            grammar,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn capitalize_first_letter(&self) -> bool {
        self.capitalize_first_letter
    }

    /// Follows `chain` from the root of the phrase tree.
    pub fn lookup(&self, chain: &[&str]) -> Option<&Value> {
        lookup(&self.phrases, chain)
    }

    /// Resolves the first chain that exists, in order.
    pub fn lookup_first(&self, chains: &[&[&str]]) -> Option<&Value> {
        lookup_first(&self.phrases, chains)
    }

    /// Looks up a string constant such as `["constants", "modifier", "left"]`.
    pub fn constant(&self, chain: &[&str]) -> Option<&str> {
        self.lookup(chain).and_then(Value::as_str)
    }

    pub fn has_maneuver(&self, maneuver_type: &str) -> bool {
        maneuver_type != "constants"
            && maneuver_type != "modes"
            && maneuver_type != "phrase"
            && self.phrases.get(maneuver_type).is_some()
    }

    /// Applies the named grammar rules to `value`.
    ///
    /// Rules see the value padded with one space on each side so patterns can
    /// anchor on word boundaries; the result is trimmed again. Unknown grammar
    /// names leave the value untouched.
    pub fn grammarize(&self, value: &str, grammar: Option<&str>) -> String {
        let Some(rules) = grammar.and_then(|name| self.grammar.get(name)) else {
            return value.to_string();
        };

        let mut padded = format!(" {} ", value);
        for rule in rules {
            padded = rule
                .pattern
                .replace(&padded, rule.replacement.as_str())
                .into_owned();
        }
        padded.trim().to_string()
    }
}

/// Follows `chain` through nested objects.
pub fn lookup<'a>(root: &'a Value, chain: &[&str]) -> Option<&'a Value> {
    chain.iter().try_fold(root, |node, key| node.get(*key))
}

/// Returns the first chain that resolves, in order.
pub fn lookup_first<'a>(root: &'a Value, chains: &[&[&str]]) -> Option<&'a Value> {
    chains.iter().find_map(|chain| lookup(root, chain))
}
