//! Compress stage: drop decoration and narration, collapse blank runs.

/// Transition phrases that open a line of narration before a tool call.
const FILLER_PREFIXES: [&str; 15] = [
    "now let's",
    "now let me",
    "now i'll",
    "now i need to",
    "now update",
    "now we need",
    "now we'll",
    "let me now",
    "let's now",
    "next, i'll",
    "next, let's",
    "next i'll",
    "next let's",
    "i'll now",
    "i need to now",
];

const BANNER_RULES: [&str; 2] = ["---", "\u{2500}\u{2500}\u{2500}"];
const BANNER_ROLES: [&str; 2] = ["ASSISTANT", "USER"];

/// Remove user/assistant banners and planning filler, and collapse runs of
/// blank lines. Every kept line ends with `\n`.
///
/// Applying it twice gives the same result as applying it once.
#[must_use]
pub fn compress(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;

    for line in text.lines() {
        if is_role_banner(line) || is_planning_filler(line) {
            continue;
        }
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// `--- USER ---` or `--- ASSISTANT (model) ---`, in either rule style.
fn is_role_banner(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(inner) = BANNER_RULES
        .iter()
        .find_map(|rule| trimmed.strip_prefix(rule))
    else {
        return false;
    };
    let Some(inner) = BANNER_RULES.iter().find_map(|rule| inner.strip_suffix(rule)) else {
        return false;
    };
    let inner = inner.trim();

    BANNER_ROLES.iter().any(|role| {
        inner.strip_prefix(role).is_some_and(|rest| {
            let rest = rest.trim();
            rest.is_empty() || (rest.starts_with('(') && rest.ends_with(')'))
        })
    })
}

fn is_planning_filler(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.ends_with(':') {
        return false;
    }
    let lower = trimmed.to_lowercase();
    FILLER_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}
