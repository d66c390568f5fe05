//! Parses the model's sectioned prose reply into structured timeline data.
//!
//! The format is a fixed marker grammar (see `crate::llm::prompts`): a
//! summary section, then an event list split by `--事件N--` delimiters, each
//! event carrying labeled fields. The parser is total: any malformed or
//! missing piece degrades to an empty field, never an error.

use tracing::debug;

use super::types::{Person, TimelineData, TimelineEvent};

const SUMMARY_MARKER: &str = "===总结===";
const EVENTS_MARKER: &str = "===事件列表===";
const EVENT_DELIM_PREFIX: &str = "--事件";

const DATE_LABEL: &str = "日期：";
const TITLE_LABEL: &str = "标题：";
const DESC_LABEL: &str = "描述：";
const PEOPLE_LABEL: &str = "相关人物：";
const SOURCE_LABEL: &str = "来源：";

const FIELD_LABELS: [&str; 5] = [DATE_LABEL, TITLE_LABEL, DESC_LABEL, PEOPLE_LABEL, SOURCE_LABEL];

const SOURCE_FALLBACK: &str = "未指明来源";
const ROLE_FALLBACK: &str = "相关人物";

pub fn parse_timeline(text: &str) -> TimelineData {
    TimelineData {
        summary: extract_summary(text),
        events: extract_events(text),
    }
}

fn extract_summary(text: &str) -> String {
    let Some(start) = text.find(SUMMARY_MARKER) else {
        debug!("summary marker absent in model reply");
        return String::new();
    };
    let after = &text[start + SUMMARY_MARKER.len()..];
    let end = after.find(EVENTS_MARKER).unwrap_or(after.len());
    after[..end].trim().to_string()
}

fn extract_events(text: &str) -> Vec<TimelineEvent> {
    let Some(start) = text.find(EVENTS_MARKER) else {
        debug!("events marker absent in model reply");
        return Vec::new();
    };
    let block = &text[start + EVENTS_MARKER.len()..];

    let mut events: Vec<TimelineEvent> = split_event_fragments(block)
        .into_iter()
        .enumerate()
        .map(|(index, fragment)| parse_event_fragment(index, fragment))
        .collect();

    // Ascending sort on the digits of the date string. This is a textual
    // comparison, not a calendrical one: "2023-11" strips to "202311" and
    // sorts before "2023-9" ("20239").
    events.sort_by(|a, b| digit_key(&a.date).cmp(&digit_key(&b.date)));
    events
}

/// Splits on `--事件N--` delimiters, dropping whitespace-only fragments
/// (including whatever precedes the first delimiter).
fn split_event_fragments(block: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut rest = block;

    while let Some((delim_start, delim_end)) = find_event_delimiter(rest) {
        fragments.push(&rest[..delim_start]);
        rest = &rest[delim_end..];
    }
    fragments.push(rest);

    fragments
        .into_iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

/// Locates the next `--事件<digits>--` delimiter, returning its byte range.
fn find_event_delimiter(s: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(pos) = s[from..].find(EVENT_DELIM_PREFIX) {
        let start = from + pos;
        let after_prefix = start + EVENT_DELIM_PREFIX.len();
        let digits = s[after_prefix..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits > 0 && s[after_prefix + digits..].starts_with("--") {
            return Some((start, after_prefix + digits + 2));
        }
        from = after_prefix;
    }
    None
}

fn parse_event_fragment(index: usize, fragment: &str) -> TimelineEvent {
    let source = field(fragment, SOURCE_LABEL)
        .filter(|s| !s.is_empty())
        .unwrap_or(SOURCE_FALLBACK);

    TimelineEvent {
        id: format!("event-{index}"),
        date: field(fragment, DATE_LABEL).unwrap_or_default().to_string(),
        title: field(fragment, TITLE_LABEL).unwrap_or_default().to_string(),
        description: field(fragment, DESC_LABEL).unwrap_or_default().to_string(),
        people: parse_people(field(fragment, PEOPLE_LABEL).unwrap_or_default()),
        source: source.to_string(),
    }
}

/// Captures the text after `label` up to the earliest following field label,
/// trimmed. `None` when the label is absent.
fn field<'a>(fragment: &'a str, label: &str) -> Option<&'a str> {
    let start = fragment.find(label)? + label.len();
    let rest = &fragment[start..];
    let end = FIELD_LABELS
        .iter()
        .filter(|l| **l != label)
        .filter_map(|l| rest.find(l))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn parse_people(text: &str) -> Vec<Person> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(parse_person_entry)
        .collect()
}

/// `名字(角色,#颜色)` parses exactly; anything else falls back to the text
/// before the first `(` as the name with a synthesized color.
fn parse_person_entry(entry: &str) -> Option<Person> {
    if let Some(person) = parse_structured_person(entry) {
        return Some(person);
    }

    let name = entry.split('(').next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }
    Some(Person {
        name: name.to_string(),
        role: ROLE_FALLBACK.to_string(),
        color: random_color(),
    })
}

fn parse_structured_person(entry: &str) -> Option<Person> {
    let open = entry.find('(')?;
    let rest = &entry[open + 1..];
    let comma = rest.find(',')?;
    let close_offset = rest[comma + 1..].find(')')?;

    Some(Person {
        name: entry[..open].trim().to_string(),
        role: rest[..comma].trim().to_string(),
        color: rest[comma + 1..comma + 1 + close_offset].trim().to_string(),
    })
}

fn random_color() -> String {
    format!("#{:06x}", fastrand::u32(..16_777_216))
}

fn digit_key(date: &str) -> String {
    date.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_block(date: &str, title: &str) -> String {
        format!("--事件1--\n日期：{date}\n标题：{title}\n描述：d\n相关人物：\n来源：s\n")
    }

    #[test]
    fn empty_text_yields_empty_timeline() {
        let data = parse_timeline("");
        assert!(data.events.is_empty());
        assert_eq!(data.summary, "");
    }

    #[test]
    fn unstructured_text_yields_empty_timeline() {
        let data = parse_timeline("完全不符合格式的自由文本，没有任何标记。");
        assert!(data.events.is_empty());
        assert_eq!(data.summary, "");
    }

    #[test]
    fn summary_extracted_between_markers() {
        let text = "===总结===\n这是一段总结。\n\n===事件列表===\n";
        assert_eq!(parse_timeline(text).summary, "这是一段总结。");
    }

    #[test]
    fn summary_extends_to_end_without_events_marker() {
        let text = "===总结===\n只有总结，没有事件。";
        let data = parse_timeline(text);
        assert_eq!(data.summary, "只有总结，没有事件。");
        assert!(data.events.is_empty());
    }

    #[test]
    fn parses_a_complete_event() {
        let text = "\
===总结===
总结文字。

===事件列表===

--事件1--
日期：2024-02-24
标题：会谈开始
描述：双方代表在边境城市开始会谈，持续了三天。
相关人物：张三(总统,#ff0000);李四(外交官,#00ff00)
来源：新华社
";
        let data = parse_timeline(text);
        assert_eq!(data.events.len(), 1);

        let event = &data.events[0];
        assert_eq!(event.id, "event-0");
        assert_eq!(event.date, "2024-02-24");
        assert_eq!(event.title, "会谈开始");
        assert!(event.description.contains("持续了三天"));
        assert_eq!(event.source, "新华社");
        assert_eq!(event.people.len(), 2);
    }

    #[test]
    fn structured_person_entry_parses_exactly() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：张三(总统,#ff0000)\n来源：s\n";
        let person = &parse_timeline(text).events[0].people[0];

        assert_eq!(
            *person,
            Person {
                name: "张三".to_string(),
                role: "总统".to_string(),
                color: "#ff0000".to_string(),
            }
        );
    }

    #[test]
    fn bare_person_entry_gets_fallback_role_and_valid_color() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：李四\n来源：s\n";
        let person = &parse_timeline(text).events[0].people[0];

        assert_eq!(person.name, "李四");
        assert_eq!(person.role, "相关人物");
        assert_eq!(person.color.len(), 7);
        assert!(person.color.starts_with('#'));
        assert!(person.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unclosed_person_entry_falls_back_to_name_before_paren() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：王五(外长\n来源：s\n";
        let person = &parse_timeline(text).events[0].people[0];

        assert_eq!(person.name, "王五");
        assert_eq!(person.role, "相关人物");
    }

    #[test]
    fn people_split_on_semicolons_skipping_blanks() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：张三(总统,#ff0000); ;李四\n来源：s\n";
        let people = &parse_timeline(text).events[0].people;

        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "张三");
        assert_eq!(people[1].name, "李四");
    }

    #[test]
    fn missing_source_defaults_to_sentinel() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：\n";
        assert_eq!(parse_timeline(text).events[0].source, "未指明来源");
    }

    #[test]
    fn empty_source_also_defaults_to_sentinel() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：d\n相关人物：\n来源：\n";
        assert_eq!(parse_timeline(text).events[0].source, "未指明来源");
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let text = "===事件列表===\n--事件1--\n一段没有任何字段标签的文字\n";
        let event = &parse_timeline(text).events[0];

        assert_eq!(event.date, "");
        assert_eq!(event.title, "");
        assert_eq!(event.description, "");
        assert!(event.people.is_empty());
        assert_eq!(event.source, "未指明来源");
    }

    #[test]
    fn multiline_description_captured_up_to_next_label() {
        let text = "===事件列表===\n--事件1--\n日期：2023\n标题：t\n描述：第一行。\n第二行。\n相关人物：\n来源：s\n";
        let event = &parse_timeline(text).events[0];

        assert_eq!(event.description, "第一行。\n第二行。");
    }

    #[test]
    fn events_sort_by_stripped_digits_not_by_calendar() {
        // "2023-11" strips to "202311", "2023-9" to "20239"; byte order puts
        // "202311" first, so November sorts before September. Deliberate.
        let text = format!(
            "===事件列表===\n{}\n{}",
            event_block("2023-9", "九月"),
            event_block("2023-11", "十一月")
        );
        let events = parse_timeline(&text).events;

        assert_eq!(events[0].date, "2023-11");
        assert_eq!(events[1].date, "2023-9");
    }

    #[test]
    fn equal_length_dates_sort_ascending() {
        let text = format!(
            "===事件列表===\n{}\n{}\n{}",
            event_block("2024-03-01", "三月"),
            event_block("2022-01-15", "一月"),
            event_block("2023-07-09", "七月")
        );
        let events = parse_timeline(&text).events;

        let dates: Vec<&str> = events.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2022-01-15", "2023-07-09", "2024-03-01"]);
    }

    #[test]
    fn ids_are_assigned_before_the_sort() {
        let text = format!(
            "===事件列表===\n{}\n{}",
            event_block("2024", "后来的"),
            event_block("2020", "更早的")
        );
        let events = parse_timeline(&text).events;

        // the textually-second event sorts first but keeps its original index
        assert_eq!(events[0].id, "event-1");
        assert_eq!(events[0].date, "2020");
        assert_eq!(events[1].id, "event-0");
    }

    #[test]
    fn delimiter_requires_digits_and_closing_dashes() {
        let text = "===事件列表===\n--事件--\n日期：2023\n标题：t\n描述：d\n";
        // "--事件--" without digits is not a delimiter, so the block is one
        // fragment of free text and still yields a single event.
        let events = parse_timeline(text).events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, "2023");
    }

    #[test]
    fn whitespace_preamble_is_discarded_but_text_preamble_is_kept() {
        let text = "===事件列表===\n\n--事件1--\n日期：2023\n标题：t\n描述：d\n来源：s\n";
        assert_eq!(parse_timeline(text).events.len(), 1);

        // a non-empty preamble fragment survives the split and becomes a
        // fieldless event, same as the original behavior
        let noisy = "===事件列表===\n以下是事件：\n--事件1--\n日期：2023\n标题：t\n描述：d\n来源：s\n";
        let events = parse_timeline(noisy).events;
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.title == "t"));
        assert!(events.iter().any(|e| e.title.is_empty() && e.date.is_empty()));
    }
}
