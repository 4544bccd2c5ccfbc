//! Keyword heuristics for correspondence review.
//!
//! Pure functions of the lower-cased text. The topic rules are a priority
//! cascade: the first category with a matching keyword wins.

use crate::domain::{ClassificationResult, Direction, Topic};

const INCOMING_MARKERS: &[&str] = &["вх", "уведомление"];

const TOPIC_RULES: &[(Topic, &[&str])] = &[
    (Topic::Finance, &["аванс", "оплата", "счет", "к оплате"]),
    (
        Topic::Progress,
        &["готовность", "строеготовность", "работы", "график"],
    ),
    (Topic::Quality, &["замечания", "акт", "претензия", "дефект"]),
    (Topic::Approval, &["согласование", "утверждение", "техно"]),
];

const RISK_MARKERS: &[&str] = &["не можем", "невозможно", "срыв", "штраф", "расторжение"];

pub fn classify(text: &str) -> ClassificationResult {
    let lower = text.to_lowercase();
    ClassificationResult {
        direction: direction_of(&lower),
        topic: topic_of(&lower),
        risk: contains_any(&lower, RISK_MARKERS),
    }
}

fn direction_of(lower: &str) -> Direction {
    if contains_any(lower, INCOMING_MARKERS) {
        Direction::Incoming
    } else {
        Direction::Outgoing
    }
}

fn topic_of(lower: &str) -> Topic {
    TOPIC_RULES
        .iter()
        .find(|(_, keywords)| contains_any(lower, keywords))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::Other)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
