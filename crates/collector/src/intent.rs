use once_cell::sync::Lazy;
use pairs_protocol::{InstructionPair, Intent};
use regex::Regex;

/// Ordered `(intent, pattern)` rules; the first match wins.
const INTENT_RULES: &[(Intent, &str)] = &[
    (
        Intent::Code,
        r"\b(code|python|javascript|function|class|api|regex|sql|pandas|numpy|bug|error|compile|algorithm)\b",
    ),
    (
        Intent::Math,
        r"\b(prove|theorem|equation|integral|derivative|algebra|geometry|probability|statistics|matrix|vector)\b",
    ),
    (
        Intent::Reasoning,
        r"\b(riddle|logic|reason|puzzle|deduce|explain why|chain of thought|step by step)\b",
    ),
    (
        Intent::Qa,
        r"\b(who|what|when|where|why|how|compare|define|summarize|explain)\b",
    ),
    (
        Intent::Creative,
        r"\b(poem|story|lyrics|song|novel|character|creative|narrative)\b",
    ),
    (
        Intent::Roleplay,
        r"\b(roleplay|act as|simulate|persona|character)\b",
    ),
    (
        Intent::Writing,
        r"\b(rewrite|edit|improve|paraphrase|grammar|style|tone|email|essay)\b",
    ),
    (
        Intent::Data,
        r"\b(extract|table|csv|json|xml|schema|map fields|normalize)\b",
    ),
    (
        Intent::Assistant,
        r"\b(schedule|remind|organize|plan|checklist|itinerary|steps)\b",
    ),
];

static COMPILED_RULES: Lazy<Vec<(Intent, Regex)>> = Lazy::new(|| {
    INTENT_RULES
        .iter()
        .map(|(intent, pattern)| {
            let regex = Regex::new(&format!("(?i){pattern}"))
                .unwrap_or_else(|err| unreachable!("intent rule {intent}: {err}"));
            (*intent, regex)
        })
        .collect()
});

/// Regex rule classifier for instruction intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    #[must_use]
    pub fn classify(text: &str) -> Intent {
        if text.trim().is_empty() {
            return Intent::Other;
        }
        COMPILED_RULES
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map_or(Intent::Other, |(intent, _)| *intent)
    }

    /// Intent of a pair from its instruction and context.
    #[must_use]
    pub fn classify_pair(pair: &InstructionPair) -> Intent {
        Self::classify(&pair.intent_text())
    }
}
