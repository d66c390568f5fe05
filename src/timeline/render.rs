use super::types::TimelineData;

/// Renders a timeline as markdown for the terminal.
pub fn render_timeline(query: &str, data: &TimelineData) -> String {
    let mut out = format!("# Timeline: {query}\n\n");

    if !data.summary.is_empty() {
        out.push_str("## Summary\n\n");
        out.push_str(&data.summary);
        out.push_str("\n\n");
    }

    if data.events.is_empty() {
        out.push_str("No events found.\n");
        return out;
    }

    out.push_str("## Events\n\n");
    for event in &data.events {
        if event.date.is_empty() {
            out.push_str(&format!("### {}\n\n", event.title));
        } else {
            out.push_str(&format!("### {} {}\n\n", event.date, event.title));
        }

        if !event.description.is_empty() {
            out.push_str(&event.description);
            out.push_str("\n\n");
        }

        if !event.people.is_empty() {
            let people: Vec<String> = event
                .people
                .iter()
                .map(|p| format!("{} ({})", p.name, p.role))
                .collect();
            out.push_str(&format!("People: {}\n", people.join(", ")));
        }

        out.push_str(&format!("Source: {}\n\n", event.source));
    }

    out
}
