/// Fewest intents that produce a summary
pub const MIN_INTENTS: usize = 5;

pub const NOT_ENOUGH_DATA: &str = "Not enough browsing data to generate a summary yet.";

/// Describe the most frequent intents in one sentence. Labels with equal
/// counts keep the order they first appeared in.
#[inline]
pub fn summarize_intents(intents: &[String]) -> String {
    if intents.len() < MIN_INTENTS {
        return NOT_ENOUGH_DATA.to_string();
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for intent in intents {
        match counts.iter_mut().find(|(label, _)| *label == intent.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((intent.as_str(), 1)),
        }
    }
    // stable: ties stay in first-occurrence order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut ranked = counts.into_iter().map(|(label, _)| label);
    let primary = ranked.next().unwrap_or_default();
    let secondary: Vec<&str> = ranked.take(2).collect();

    match secondary.as_slice() {
        [] => format!("Your recent browsing shows a primary interest in {}.", primary),
        [only] => format!(
            "Your recent browsing shows a primary interest in {}, with a secondary interest in {}.",
            primary, only
        ),
        _ => format!(
            "Your recent browsing shows a primary interest in {}, with secondary interests in {}.",
            primary,
            secondary.join(" and ")
        ),
    }
}
