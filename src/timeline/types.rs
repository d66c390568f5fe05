use serde::Serialize;

/// A person referenced by a timeline event. `color` is a `#RRGGBB` string
/// used to keep one actor visually consistent across events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
    pub role: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    /// Positional label (`event-<index>`), assigned before the date sort.
    pub id: String,
    /// Loose date string: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
    pub date: String,
    pub title: String,
    pub description: String,
    pub people: Vec<Person>,
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimelineData {
    pub summary: String,
    pub events: Vec<TimelineEvent>,
}
