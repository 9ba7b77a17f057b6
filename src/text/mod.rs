//! Turn-instruction templating.
//!
//! [`TextInstructions::compile`] turns one routing step into a localised
//! sentence:
//!
//! 1. pick the phrase object for the step's travel mode, or its maneuver type
//!    and modifier (unknown types degrade to `turn`);
//! 2. resolve the lane and roundabout special cases;
//! 3. pick the phrase variant (exit/destination/junction/name/default);
//! 4. substitute `{tag}` and `{tag:grammar}` tokens and capitalise.
//!
//! Everything language-specific lives in [`Language`] tables.

mod language;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

pub use language::{BUILTIN, Language, lookup, lookup_first};

use crate::error::TextError;
use crate::osrm_response::Step;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)(?::(\w+))?\}").expect("valid token pattern"));
static DOUBLE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid space pattern"));

/// Context of a step within its route.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub leg_index: Option<usize>,
    pub leg_count: usize,
    /// Road classes of the step, e.g. `motorway`.
    pub classes: Vec<String>,
    /// Display name of the waypoint an `arrive` step reaches.
    pub waypoint_name: Option<String>,
}

/// Compiles routing steps into sentences of one language.
#[derive(Debug)]
pub struct TextInstructions {
    language: Language,
}

impl TextInstructions {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Convenience for one of the built-in languages.
    pub fn builtin(code: &str) -> Result<Self, TextError> {
        Language::builtin(code).map(Self::new)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn compile(&self, step: &Step, options: &CompileOptions) -> Result<String, TextError> {
        let maneuver = step.maneuver.as_ref().ok_or(TextError::MissingType)?;
        let raw_type = maneuver.maneuver_type.as_deref().ok_or(TextError::MissingType)?;
        let modifier = maneuver.modifier.as_deref();
        if raw_type != "depart" && raw_type != "arrive" && modifier.is_none() {
            return Err(TextError::MissingModifier {
                maneuver_type: raw_type.to_string(),
            });
        }

        let maneuver_type = if self.language.has_maneuver(raw_type) {
            raw_type
        } else {
            "turn"
        };

        let mut object = self.phrase_object(step, maneuver_type, modifier);

        let mut lane_instruction = None;
        match maneuver_type {
            "use lane" => {
                let config = lane_config(step)?;
                lane_instruction = self
                    .language
                    .constant(&["constants", "lanes", &config])
                    .map(str::to_string);
                if lane_instruction.is_none() {
                    object = self.language.lookup(&["use lane", "no_lanes"]);
                }
            }
            "rotary" | "roundabout" => {
                object = object.and_then(|obj| {
                    let has_name = step.rotary_name.is_some();
                    let has_exit = maneuver.exit.is_some();
                    let variant = match (has_name, has_exit) {
                        (true, true) if obj.get("name_exit").is_some() => "name_exit",
                        (_, true) if obj.get("exit").is_some() => "exit",
                        (true, _) if obj.get("name").is_some() => "name",
                        _ => "default",
                    };
                    obj.get(variant)
                });
            }
            _ => {}
        }

        let way_name = self.get_way_name(step, &options.classes);
        let template = object.map_or("", |obj| select_variant(obj, step, &way_name, options));

        let destination = first_destination(step.destinations.as_deref());
        let nth = match options.leg_index {
            Some(index) if index + 1 != options.leg_count => self.ordinalize(index + 1),
            _ => String::new(),
        };

        let mut tokens = HashMap::new();
        tokens.insert("way_name", way_name);
        tokens.insert("destination", destination);
        tokens.insert("exit", first_item(step.exits.as_deref()));
        tokens.insert("exit_number", self.ordinalize(maneuver.exit.unwrap_or(1) as usize));
        tokens.insert("rotary_name", step.rotary_name.clone().unwrap_or_default());
        tokens.insert("lane_instruction", lane_instruction.unwrap_or_default());
        tokens.insert(
            "modifier",
            modifier
                .and_then(|m| self.language.constant(&["constants", "modifier", m]))
                .unwrap_or_default()
                .to_string(),
        );
        tokens.insert("direction", self.direction_from_degree(maneuver.bearing_after)?);
        tokens.insert("nth", nth);
        tokens.insert("waypoint_name", options.waypoint_name.clone().unwrap_or_default());
        tokens.insert("junction_name", first_item(step.junction_name.as_deref()));

        Ok(self.tokenize(template, &tokens))
    }

    fn phrase_object(
        &self,
        step: &Step,
        maneuver_type: &str,
        modifier: Option<&str>,
    ) -> Option<&Value> {
        let mut chains: Vec<Vec<&str>> = vec![vec!["modes", step.mode.as_str()]];
        let omit_side = maneuver_type == "off ramp"
            && matches!(
                (modifier, step.driving_side.as_deref()),
                (Some(m), Some(side)) if m.contains(side)
            );
        if let (Some(modifier), false) = (modifier, omit_side) {
            chains.push(vec![maneuver_type, modifier]);
        }
        chains.push(vec![maneuver_type, "default"]);

        let chains: Vec<&[&str]> = chains.iter().map(Vec::as_slice).collect();
        self.language.lookup_first(&chains)
    }

    /// Display name of the road a step continues on.
    ///
    /// Combines name and reference unless the road is a motorway; motorways
    /// prefer a numeric reference on its own.
    pub fn get_way_name(&self, step: &Step, classes: &[String]) -> String {
        let name = step.name.as_str();
        let reference = step.reference.as_deref().unwrap_or_default();
        let is_motorway = classes.iter().any(|class| class == "motorway");

        if !name.is_empty() && !reference.is_empty() && name != reference && !is_motorway {
            let phrase = self
                .language
                .constant(&["phrase", "name and ref"])
                .unwrap_or("{name} ({ref})");
            let mut tokens = HashMap::new();
            tokens.insert("name", name.to_string());
            tokens.insert("ref", reference.to_string());
            self.substitute(phrase, &tokens, false)
        } else if !name.is_empty()
            && !reference.is_empty()
            && is_motorway
            && reference.chars().any(|c| c.is_ascii_digit())
        {
            reference.to_string()
        } else if name.is_empty() && !reference.is_empty() {
            reference.to_string()
        } else {
            name.to_string()
        }
    }

    /// Localised ordinal for 1..=10, empty otherwise.
    pub fn ordinalize(&self, number: usize) -> String {
        self.language
            .constant(&["constants", "ordinalize", &number.to_string()])
            .unwrap_or_default()
            .to_string()
    }

    /// Localised compass direction for a bearing in degrees.
    pub fn direction_from_degree(&self, degree: Option<f64>) -> Result<String, TextError> {
        let Some(degree) = degree else {
            return Ok(String::new());
        };
        let key = compass_key(degree)?;
        Ok(self
            .language
            .constant(&["constants", "direction", key])
            .unwrap_or(key)
            .to_string())
    }

    /// Substitutes tokens, grammar-processes them and capitalises.
    ///
    /// Tags missing from `tokens` are left in the output verbatim.
    pub fn tokenize(&self, template: &str, tokens: &HashMap<&str, String>) -> String {
        self.substitute(template, tokens, self.language.capitalize_first_letter())
    }

    pub fn capitalize_first_letter(&self, value: &str) -> String {
        capitalize(value)
    }

    fn substitute(
        &self,
        template: &str,
        tokens: &HashMap<&str, String>,
        capitalize_first: bool,
    ) -> String {
        let mut started_with_token = false;
        let output = TOKEN.replace_all(template, |caps: &Captures<'_>| {
            let Some(value) = caps.get(1).and_then(|tag| tokens.get(tag.as_str())) else {
                return caps[0].to_string();
            };
            let value = self.language.grammarize(value, caps.get(2).map(|g| g.as_str()));
            if capitalize_first && caps.get(0).is_some_and(|m| m.start() == 0) {
                started_with_token = true;
                capitalize(&value)
            } else {
                value
            }
        });
        let output = DOUBLE_SPACE.replace_all(&output, " ").into_owned();

        if capitalize_first && !started_with_token {
            capitalize(&output)
        } else {
            output
        }
    }
}

/// Collapses lane validity into runs: `o` for usable lanes, `x` otherwise.
pub fn lane_config(step: &Step) -> Result<String, TextError> {
    let lanes = step
        .intersections
        .first()
        .and_then(|intersection| intersection.lanes.as_ref())
        .ok_or(TextError::MissingLanes)?;
    Ok(collapse_lanes(lanes.iter().map(|lane| lane.valid)))
}

/// One character per run of equally valid lanes.
pub fn collapse_lanes(validity: impl IntoIterator<Item = bool>) -> String {
    let mut config = String::new();
    let mut current = None;
    for valid in validity {
        if current != Some(valid) {
            config.push(if valid { 'o' } else { 'x' });
            current = Some(valid);
        }
    }
    config
}

/// Direction key for a bearing, using the uneven ranges the phrase tables
/// were written for.
fn compass_key(degree: f64) -> Result<&'static str, TextError> {
    if !(0.0..=360.0).contains(&degree) {
        return Err(TextError::InvalidBearing(degree as i64));
    }
    Ok(match degree {
        d if d <= 20.0 => "north",
        d if d < 70.0 => "northeast",
        d if d <= 110.0 => "east",
        d if d < 160.0 => "southeast",
        d if d <= 200.0 => "south",
        d if d < 250.0 => "southwest",
        d if d <= 290.0 => "west",
        d if d < 340.0 => "northwest",
        _ => "north",
    })
}

fn select_variant<'a>(
    object: &'a Value,
    step: &Step,
    way_name: &str,
    options: &CompileOptions,
) -> &'a str {
    let has = |key: &str| object.get(key).and_then(Value::as_str);
    let candidates = [
        (step.destinations.is_some() && step.exits.is_some(), "exit_destination"),
        (step.destinations.is_some(), "destination"),
        (step.exits.is_some(), "exit"),
        (step.junction_name.is_some(), "junction_name"),
        (!way_name.is_empty(), "name"),
        (options.waypoint_name.as_deref().is_some_and(|n| !n.is_empty()), "named"),
    ];
    candidates
        .iter()
        .filter(|(applies, _)| *applies)
        .find_map(|(_, key)| has(key))
        .or_else(|| has("default"))
        .unwrap_or_default()
}

/// `"A1, A2: Berlin, Hamburg"` becomes `"A1: Berlin"`.
fn first_destination(destinations: Option<&str>) -> String {
    let Some(destinations) = destinations else {
        return String::new();
    };
    let mut parts = destinations.split(": ");
    let reference = parts.next().and_then(|r| r.split(',').next()).unwrap_or_default();
    let name = parts.next().and_then(|d| d.split(',').next()).unwrap_or_default();
    match (reference.is_empty(), name.is_empty()) {
        (false, false) => format!("{}: {}", reference, name),
        (false, true) => reference.to_string(),
        _ => name.to_string(),
    }
}

fn first_item(list: Option<&str>) -> String {
    list.and_then(|l| l.split(';').next()).unwrap_or_default().to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
