//! Display formatting for the itinerary: distances, durations, icons.

use serde::Deserialize;

use crate::route::{Instruction, InstructionType, Modifier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnitNames {
    pub meters: String,
    pub kilometers: String,
    pub yards: String,
    pub miles: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl Default for UnitNames {
    fn default() -> Self {
        Self {
            meters: "m".to_string(),
            kilometers: "km".to_string(),
            yards: "yd".to_string(),
            miles: "mi".to_string(),
            hours: "h".to_string(),
            minutes: "min".to_string(),
            seconds: "s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    pub units: Units,
    pub unit_names: UnitNames,
    /// Positive values round to significant digits; zero or negative values
    /// print that many decimals without rounding.
    pub rounding_sensitivity: i32,
    pub distance_template: String,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            unit_names: UnitNames::default(),
            rounding_sensitivity: 1,
            distance_template: "{value} {unit}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: FormatterOptions,
}

impl Formatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    /// Formats a distance given in metres.
    ///
    /// `sensitivity` overrides the configured rounding sensitivity.
    pub fn format_distance(&self, meters: f64, sensitivity: Option<i32>) -> String {
        let sensitivity = sensitivity.unwrap_or(self.options.rounding_sensitivity);
        let simple = sensitivity <= 0;
        let round = |value: f64| {
            if simple {
                value
            } else {
                round_significant(value, f64::from(sensitivity))
            }
        };
        let names = &self.options.unit_names;

        let (value, unit) = match self.options.units {
            Units::Imperial => {
                let yards = meters / 0.9144;
                if yards >= 1000.0 {
                    (round(meters / 1609.344), &names.miles)
                } else {
                    (round(yards), &names.yards)
                }
            }
            Units::Metric => {
                let value = round(meters);
                if value >= 1000.0 {
                    (value / 1000.0, &names.kilometers)
                } else {
                    (value, &names.meters)
                }
            }
        };

        let value = if simple {
            format!("{:.*}", sensitivity.unsigned_abs() as usize, value)
        } else {
            value.to_string()
        };

        self.options
            .distance_template
            .replace("{value}", &value)
            .replace("{unit}", unit)
    }

    /// Formats a duration given in seconds, rounded to half minutes.
    pub fn format_time(&self, seconds: f64) -> String {
        let names = &self.options.unit_names;
        let t = ((seconds / 30.0).round() * 30.0) as i64;

        if t > 86_400 {
            format!("{} {}", (t as f64 / 3600.0).round(), names.hours)
        } else if t > 3600 {
            format!(
                "{} {} {} {}",
                t / 3600,
                names.hours,
                ((t % 3600) as f64 / 60.0).round(),
                names.minutes
            )
        } else if t > 300 {
            format!("{} {}", (t as f64 / 60.0).round(), names.minutes)
        } else if t > 60 {
            let rest = t % 60;
            let mut out = format!("{} {}", t / 60, names.minutes);
            if rest != 0 {
                out.push_str(&format!(" {} {}", rest, names.seconds));
            }
            out
        } else {
            format!("{} {}", t, names.seconds)
        }
    }

    /// The instruction's compiled text, or an English sentence built from its
    /// type when the router produced none.
    pub fn format_instruction(&self, instruction: &Instruction) -> String {
        if let Some(text) = &instruction.text {
            return text.clone();
        }

        let direction = instruction
            .direction
            .map(|d| compass_word(&d.to_string()))
            .unwrap_or_default();
        let modifier = instruction.modifier.map(modifier_word).unwrap_or_default();
        let exit = instruction.exit.map(ordinal).unwrap_or_default();

        let (base, onto) = match instruction.instruction_type {
            InstructionType::Head => (format!("Head {}", direction), " on {road}"),
            InstructionType::Continue => (format!("Continue {}", direction), ""),
            InstructionType::Straight => ("Straight".to_string(), " onto {road}"),
            InstructionType::SlightRight => ("Slight right".to_string(), " onto {road}"),
            InstructionType::Right => ("Right".to_string(), " onto {road}"),
            InstructionType::SharpRight => ("Sharp right".to_string(), " onto {road}"),
            InstructionType::Uturn => ("Turn around".to_string(), ""),
            InstructionType::SharpLeft => ("Sharp left".to_string(), " onto {road}"),
            InstructionType::Left => ("Left".to_string(), " onto {road}"),
            InstructionType::SlightLeft => ("Slight left".to_string(), " onto {road}"),
            InstructionType::WaypointReached => ("Waypoint reached".to_string(), ""),
            InstructionType::DestinationReached => ("Destination reached".to_string(), ""),
            InstructionType::Roundabout => {
                (format!("Take the {} exit in the roundabout", exit), " onto {road}")
            }
            InstructionType::Fork => (format!("At the fork, turn {}", modifier), " onto {road}"),
            InstructionType::Merge => (format!("Merge {}", modifier), " onto {road}"),
            InstructionType::OnRamp => (format!("Turn {} on the ramp", modifier), " onto {road}"),
            InstructionType::OffRamp => {
                (format!("Take the ramp on the {}", modifier), " onto {road}")
            }
            InstructionType::EndOfRoad => {
                (format!("Turn {} at the end of the road", modifier), " onto {road}")
            }
        };

        let mut sentence = base.trim_end().to_string();
        if !instruction.road.is_empty() {
            sentence.push_str(&onto.replace("{road}", &instruction.road));
        }
        sentence
    }

    /// Icon name for the itinerary row of the `index`-th instruction.
    pub fn icon_name(&self, instruction: &Instruction, index: usize) -> Option<&'static str> {
        match instruction.instruction_type {
            InstructionType::Head if index == 0 => return Some("depart"),
            InstructionType::WaypointReached => return Some("via"),
            InstructionType::Roundabout => return Some("enter-roundabout"),
            InstructionType::DestinationReached => return Some("arrive"),
            _ => {}
        }

        instruction.modifier.map(|modifier| match modifier {
            Modifier::Straight => "continue",
            Modifier::SlightRight => "bear-right",
            Modifier::Right => "turn-right",
            Modifier::SharpRight => "sharp-right",
            Modifier::Uturn => "u-turn",
            Modifier::SharpLeft => "sharp-left",
            Modifier::Left => "turn-left",
            Modifier::SlightLeft => "bear-left",
        })
    }
}

/// Rounds to one significant digit, in steps of half the leading power of
/// ten for small leading digits.
fn round_significant(value: f64, sensitivity: f64) -> f64 {
    let digits = ((value / sensitivity).floor() as i64).to_string().len() as i32;
    let pow10 = 10f64.powi(digits - 1);
    let leading = (value / pow10).floor();
    let step = if leading > 5.0 { pow10 } else { pow10 / 2.0 };
    (value / step).round() * step
}

fn compass_word(point: &str) -> String {
    match point {
        "N" => "north",
        "NE" => "northeast",
        "E" => "east",
        "SE" => "southeast",
        "S" => "south",
        "SW" => "southwest",
        "W" => "west",
        "NW" => "northwest",
        _ => "",
    }
    .to_string()
}

fn modifier_word(modifier: Modifier) -> String {
    match modifier {
        Modifier::Uturn => "U-turn",
        Modifier::SharpRight => "sharp right",
        Modifier::Right => "right",
        Modifier::SlightRight => "slight right",
        Modifier::Straight => "straight",
        Modifier::SlightLeft => "slight left",
        Modifier::Left => "left",
        Modifier::SharpLeft => "sharp left",
    }
    .to_string()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
