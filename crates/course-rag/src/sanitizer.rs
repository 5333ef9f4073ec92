//! Strips leaked reasoning from reasoning-model output.
//!
//! Reasoning models often narrate their process ("Let me check the search
//! results...") before answering. The sanitizer removes that narration with
//! a small, data-driven classifier:
//!
//! 1. explicit `<thinking>` style spans are deleted;
//! 2. if an answer-start marker follows narration, everything before the
//!    marker is cut;
//! 3. otherwise paragraphs are classified one by one until the first one that
//!    is clearly answer content, after which everything is kept;
//! 4. a result that is empty or shorter than the safety floor is discarded in
//!    favour of the original text.
//!
//! The classifier is a heuristic. All of its vocabulary lives in
//! [`SanitizerConfig`] so it can be tuned without touching the algorithm.

use regex::{Regex, RegexBuilder};
use tracing::{info, warn};

const DEFINITION_WINDOW_CHARS: usize = 60;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanitizerConfig {
    pub enabled: bool,
    /// Results shorter than this many characters are rejected
    pub min_length: usize,
    /// Tag names whose `<tag>...</tag>` spans are removed outright
    pub thinking_tags: Vec<String>,
    /// Tried in order; the first one present wins
    pub answer_markers: Vec<String>,
    /// Paragraph openings that mark genuine answer content
    pub answer_openers: Vec<String>,
    /// Paragraph openings that mark narration
    pub narrative_lead_ins: Vec<String>,
    /// Whole words, matched case-sensitively
    pub first_person: Vec<String>,
    /// Whole words or phrases, matched case-insensitively
    pub process_vocabulary: Vec<String>,
    /// Nouns that, next to an early parenthesized expansion, mark a definition
    pub technical_nouns: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_length: 50,
            thinking_tags: strings(&["thinking", "think"]),
            answer_markers: strings(&[
                "\n\n**",
                "\n\n# ",
                "\n\n## ",
                "\n\n### ",
                "\n\nAnswer:",
                "\n\nThe course materials",
                "\n\nIn summary",
                "\n\nTo summarize",
            ]),
            answer_openers: strings(&[
                "Answer:",
                "The course materials",
                "In summary",
                "To summarize",
                "Summary:",
                "Key ",
                "Best practices",
                "Here are the",
            ]),
            narrative_lead_ins: strings(&[
                "Okay,",
                "Ok,",
                "Alright,",
                "Hmm",
                "Wait,",
                "Let me",
                "Let's see",
                "I need to",
                "I should",
                "I'll",
                "I will",
                "First,",
                "Now,",
                "So,",
                "Looking at",
                "Looking through",
                "Looking for",
                "Looking into",
                "Starting with",
                "Based on the search",
                "Based on my search",
                "Based on the retrieved",
                "From the course",
                "From what I found",
                "From the retrieved",
                "According to the search",
                "According to the retrieved",
                "The user",
                "The search results",
                "Need to",
                "Putting this all together",
            ]),
            first_person: strings(&["I", "I'm", "I'll", "I've", "I'd", "me", "my", "My", "myself"]),
            process_vocabulary: strings(&[
                "searching",
                "search results",
                "retrieved content",
                "hmm",
                "wait",
                "actually",
                "okay",
                "let me",
                "the user",
                "need to",
                "thinking",
                "seems like",
                "it appears",
                "suggest that",
                "might be",
                "putting this all together",
                "the lesson talks about",
            ]),
            technical_nouns: strings(&[
                "technology",
                "technique",
                "protocol",
                "algorithm",
                "algorithms",
                "architecture",
                "framework",
                "model",
                "models",
                "system",
                "method",
                "standard",
                "language",
                "library",
                "database",
                "pattern",
                "style",
                "api",
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphKind {
    /// Clearly part of the answer; everything from here on is kept
    Answer,
    /// Narration or meta-commentary
    Reasoning,
    /// Kept, but does not prove the answer has started
    Neutral,
}

struct Filtered<'t> {
    kept: Vec<&'t str>,
    dropped: usize,
    found_answer: bool,
}

pub struct ResponseSanitizer {
    config: SanitizerConfig,
    thinking_spans: Option<Regex>,
    paragraph_break: Regex,
    structural_marker: Regex,
    first_person: Option<Regex>,
    process_vocabulary: Option<Regex>,
    parenthetical: Regex,
    technical_nouns: Option<Regex>,
}

const WORD_END: &str = r"\b";

/// A pronoun glued to a slash ("I/O") is part of an abbreviation
const PRONOUN_END: &str = r"\b(?:[^/\w]|$)";

/// Whole-word alternation over `phrases` closed by `word_end`, or `None` for
/// an empty list
fn phrase_regex(
    phrases: &[String],
    case_insensitive: bool,
    word_end: &str,
) -> Result<Option<Regex>, regex::Error> {
    if phrases.is_empty() {
        return Ok(None);
    }
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!(r"\b(?:{}){}", alternation, word_end))
        .case_insensitive(case_insensitive)
        .build()
        .map(Some)
}

fn thinking_regex(tags: &[String]) -> Result<Option<Regex>, regex::Error> {
    if tags.is_empty() {
        return Ok(None);
    }
    let spans = tags
        .iter()
        .map(|tag| {
            let tag = regex::escape(tag);
            format!("<{tag}>.*?</{tag}>")
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?s){}", spans)).map(Some)
}

fn starts_with_any(text: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| text.starts_with(prefix.as_str()))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl ResponseSanitizer {
    pub fn new(config: SanitizerConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            thinking_spans: thinking_regex(&config.thinking_tags)?,
            paragraph_break: Regex::new(r"\n[ \t]*\n")?,
            structural_marker: Regex::new(r"^(?:\d+[.)]|[-*•]|#{1,6})\s|^\*\*")?,
            first_person: phrase_regex(&config.first_person, false, PRONOUN_END)?,
            process_vocabulary: phrase_regex(&config.process_vocabulary, true, WORD_END)?,
            parenthetical: Regex::new(r"\([^()\n]{2,}\)")?,
            technical_nouns: phrase_regex(&config.technical_nouns, true, WORD_END)?,
            config,
        })
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Remove leaked reasoning from `text`.
    ///
    /// Returns the input unchanged when the sanitizer is disabled, when
    /// nothing was recognized as reasoning, or when the cleaned text would
    /// fall below the safety floor.
    pub fn sanitize(&self, text: &str) -> String {
        if !self.config.enabled || text.trim().is_empty() {
            return text.to_string();
        }

        let normalized = text.replace("\r\n", "\n");
        let without_spans = match &self.thinking_spans {
            Some(re) => re.replace_all(&normalized, ""),
            None => normalized.as_str().into(),
        };
        let spans_removed = without_spans.as_ref() != normalized;

        if let Some(remainder) = self.cut_at_answer_marker(&without_spans) {
            return self.accept(text, remainder.to_string());
        }

        let filtered = self.filter_paragraphs(&without_spans);
        if !spans_removed && filtered.dropped == 0 {
            return text.to_string();
        }

        let result = filtered.kept.join("\n\n").trim().to_string();
        if result.is_empty() || char_len(&result) < self.config.min_length {
            warn!(
                cleaned_len = char_len(&result),
                min_length = self.config.min_length,
                "sanitized response too short, returning original text"
            );
            return text.to_string();
        }

        self.accept(text, result)
    }

    fn accept(&self, original: &str, result: String) -> String {
        let original_len = char_len(original);
        let removed = original_len.saturating_sub(char_len(&result));
        if removed > 0 {
            info!(
                removed_chars = removed,
                percent = format!("{:.1}", removed as f64 * 100.0 / original_len as f64),
                "stripped reasoning from response"
            );
        }
        result
    }

    /// Cut everything before the first answer marker, provided the text
    /// before it is reasoning with no answer content and the rest meets the
    /// floor.
    fn cut_at_answer_marker<'t>(&self, text: &'t str) -> Option<&'t str> {
        let position = self
            .config
            .answer_markers
            .iter()
            .find_map(|marker| text.find(marker.as_str()))?;

        let prefix = self.filter_paragraphs(&text[..position]);
        if prefix.dropped == 0 || prefix.found_answer {
            return None;
        }

        let remainder = text[position..].trim();
        (char_len(remainder) >= self.config.min_length).then_some(remainder)
    }

    /// Keep paragraphs that are not reasoning
    fn filter_paragraphs<'t>(&self, text: &'t str) -> Filtered<'t> {
        let mut kept = Vec::new();
        let mut dropped = 0;
        let mut found_answer = false;

        for paragraph in self.paragraph_break.split(text) {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if found_answer {
                kept.push(paragraph);
                continue;
            }
            match self.classify(paragraph) {
                ParagraphKind::Answer => {
                    found_answer = true;
                    kept.push(paragraph);
                }
                ParagraphKind::Neutral => kept.push(paragraph),
                ParagraphKind::Reasoning => dropped += 1,
            }
        }

        Filtered {
            kept,
            dropped,
            found_answer,
        }
    }

    fn classify(&self, paragraph: &str) -> ParagraphKind {
        if self.structural_marker.is_match(paragraph)
            || starts_with_any(paragraph, &self.config.answer_openers)
        {
            return ParagraphKind::Answer;
        }
        if starts_with_any(paragraph, &self.config.narrative_lead_ins) {
            return ParagraphKind::Reasoning;
        }

        let narrates = [&self.first_person, &self.process_vocabulary]
            .into_iter()
            .flatten()
            .any(|re| re.is_match(paragraph));
        if narrates && !self.looks_like_definition(paragraph) {
            return ParagraphKind::Reasoning;
        }

        ParagraphKind::Neutral
    }

    /// "RAG (Retrieval-Augmented Generation) technology ..." style openings
    fn looks_like_definition(&self, paragraph: &str) -> bool {
        let Some(nouns) = &self.technical_nouns else {
            return false;
        };
        let window_end = paragraph
            .char_indices()
            .nth(DEFINITION_WINDOW_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(paragraph.len());

        self.parenthetical
            .find(paragraph)
            .is_some_and(|m| m.start() < window_end)
            && nouns.is_match(paragraph)
    }
}
