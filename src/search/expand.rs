//! Splits a free-text query into variant queries so the fan-out search covers
//! more ground than a single literal match: temporal, person and event-type
//! slices plus fixed "latest news" / "background" / "impact" angles.

/// Event-type vocabulary for Chinese news queries. Matched by substring.
const EVENT_TYPES: &[&str] = &[
    "战争", "冲突", "和平", "协议", "会谈", "峰会", "危机", "事件",
    "爆炸", "抗议", "示威", "选举", "政变", "改革", "制裁",
    "经济", "政治", "外交", "军事", "科技", "文化", "环境", "疫情",
];

/// Title suffixes that mark a preceding name as a person of interest.
const NAME_SUFFIXES: &[&str] = &["总统", "总理", "主席", "部长", "官员", "领导人"];

const FIXED_ANGLES: &[&str] = &["最新进展", "最新消息", "背景", "影响"];

/// Expands `original` into an ordered, deduplicated list of variant queries.
/// The original query is always element 0; the function never fails.
pub fn expand_query(original: &str) -> Vec<String> {
    let tokens: Vec<&str> = original.split_whitespace().collect();
    let core = if tokens.len() > 2 {
        tokens[..3].join(" ")
    } else {
        original.to_string()
    };

    let time_tokens = extract_time_tokens(original);
    let name_tokens = extract_name_tokens(original);
    let event_tokens: Vec<&str> = EVENT_TYPES
        .iter()
        .filter(|t| original.contains(**t))
        .copied()
        .collect();

    let mut queries = vec![original.to_string()];
    if !time_tokens.is_empty() {
        queries.push(format!("{core} {}", time_tokens.join(" ")));
    }
    if !name_tokens.is_empty() {
        queries.push(format!("{core} {}", name_tokens.join(" ")));
    }
    if !event_tokens.is_empty() {
        queries.push(format!("{core} {}", event_tokens.join(" ")));
    }
    for angle in FIXED_ANGLES {
        queries.push(format!("{core} {angle}"));
    }

    dedup_preserving_order(queries)
}

/// Collects year tokens (`19xx`/`20xx`, optional trailing `年`) and short
/// numeric month/day tokens (`N月`, `N日`).
fn extract_time_tokens(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let digits: String = chars[start..i].iter().collect();
        let next = chars.get(i).copied();

        match digits.len() {
            4 if digits.starts_with("19") || digits.starts_with("20") => {
                if next == Some('年') {
                    tokens.push(format!("{digits}年"));
                    i += 1;
                } else {
                    tokens.push(digits);
                }
            }
            1 | 2 => match next {
                Some(marker @ ('月' | '日')) => {
                    tokens.push(format!("{digits}{marker}"));
                    i += 1;
                }
                _ => {}
            },
            _ => {}
        }
    }

    tokens
}

/// Finds runs of 2-4 Han ideographs immediately followed by a title suffix,
/// e.g. `美国总统` or `外交部长`. The suffix is part of the token.
fn extract_name_tokens(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let Some((suffix, suffix_len)) = suffix_at(&chars, i) else {
            i += 1;
            continue;
        };

        let mut name_start = i;
        while name_start > 0 && i - name_start < 4 && is_han(chars[name_start - 1]) {
            name_start -= 1;
        }

        if i - name_start >= 2 {
            let mut token: String = chars[name_start..i].iter().collect();
            token.push_str(suffix);
            tokens.push(token);
            i += suffix_len;
        } else {
            i += 1;
        }
    }

    tokens
}

fn suffix_at(chars: &[char], i: usize) -> Option<(&'static str, usize)> {
    for suffix in NAME_SUFFIXES {
        let suffix_chars: Vec<char> = suffix.chars().collect();
        if chars[i..].starts_with(&suffix_chars) {
            return Some((suffix, suffix_chars.len()));
        }
    }
    None
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FA5}')
}

fn dedup_preserving_order(queries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    queries.into_iter().filter(|q| seen.insert(q.clone())).collect()
}
