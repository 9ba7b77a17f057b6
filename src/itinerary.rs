//! Itinerary panel content: a summary line per route and one row per
//! instruction.

use crate::formatter::Formatter;
use crate::route::Route;

/// Decimals used for the whole-route distance in the summary.
const TOTAL_DISTANCE_SENSITIVITY: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryRow {
    pub icon: Option<&'static str>,
    pub text: String,
    /// Empty for zero-length steps such as arrivals.
    pub distance: String,
}

#[derive(Debug, Clone, Default)]
pub struct Itinerary {
    formatter: Formatter,
}

impl Itinerary {
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// `"{name}: {distance}, {time}"`.
    pub fn summary(&self, route: &Route) -> String {
        format!(
            "{}: {}, {}",
            route.name,
            self.formatter
                .format_distance(route.summary.total_distance, Some(TOTAL_DISTANCE_SENSITIVITY)),
            self.formatter.format_time(route.summary.total_time)
        )
    }

    /// Summaries of the selected route and its alternatives, in order.
    pub fn summaries<'a>(&self, routes: impl IntoIterator<Item = &'a Route>) -> Vec<String> {
        routes.into_iter().map(|route| self.summary(route)).collect()
    }

    pub fn rows(&self, route: &Route) -> Vec<ItineraryRow> {
        route
            .instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| ItineraryRow {
                icon: self.formatter.icon_name(instruction, index),
                text: self.formatter.format_instruction(instruction),
                distance: if instruction.distance > 0.0 {
                    self.formatter.format_distance(instruction.distance, None)
                } else {
                    String::new()
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Instruction, InstructionType, Modifier, Summary};

    fn instruction(instruction_type: InstructionType, distance: f64, text: &str) -> Instruction {
        Instruction {
            instruction_type,
            modifier: None,
            distance,
            time: 0.0,
            road: String::new(),
            direction: None,
            exit: None,
            index: 0,
            mode: "driving".to_string(),
            text: Some(text.to_string()),
        }
    }

    fn route() -> Route {
        let mut turn = instruction(InstructionType::Left, 420.0, "Turn left onto Torstraße");
        turn.modifier = Some(Modifier::Left);
        Route {
            name: "Friedrichstraße, Torstraße".to_string(),
            summary: Summary {
                total_distance: 1886.3,
                total_time: 251.5,
            },
            instructions: vec![
                instruction(InstructionType::Head, 1466.3, "Head north on Friedrichstraße"),
                turn,
                instruction(
                    InstructionType::DestinationReached,
                    0.0,
                    "You have arrived at your destination",
                ),
            ],
            ..Route::default()
        }
    }

    #[test]
    fn test_summary() {
        let itinerary = Itinerary::default();
        assert_eq!(itinerary.summary(&route()), "Friedrichstraße, Torstraße: 1.9 km, 4 min");
    }

    #[test]
    fn test_rows() {
        let rows = Itinerary::default().rows(&route());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].icon, Some("depart"));
        assert_eq!(rows[0].distance, "1.5 km");
        assert_eq!(rows[1].icon, Some("turn-left"));
        assert_eq!(rows[1].text, "Turn left onto Torstraße");
        assert_eq!(rows[1].distance, "400 m");
        assert_eq!(rows[2].icon, Some("arrive"));
        assert_eq!(rows[2].distance, "");
    }
}
