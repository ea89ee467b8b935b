//! Keyword-driven assistant replies
//!
//! Input is split into lowercase alphanumeric words. A keyword matches a word
//! exactly, its plural, or (for keywords of four letters or more) any word it
//! prefixes, so "saving" also catches "savings". Multi-word keywords match
//! consecutive words. Groups are tried in order; first match wins.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const EMPTY_INPUT_REPLY: &str = "Please enter a message.";

pub const FALLBACK_REPLY: &str = "I'm here to help with remittances, savings goals, and donations. \
     Could you please rephrase your question?";

struct KeywordGroup {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        keywords: &["hello", "hi", "hey"],
        reply: "Hello! I'm your UniPay Assistant. How can I help you with money transfers, \
                savings, or donations today?",
    },
    KeywordGroup {
        keywords: &["remittance", "transfer", "send money"],
        reply: "I can help with money transfers! Our platform supports secure remittances to \
                multiple countries with competitive fees.",
    },
    KeywordGroup {
        keywords: &["fee", "cost", "charge"],
        reply: "Transfer fees vary by destination and amount. You can check our fees page for \
                detailed pricing information.",
    },
    KeywordGroup {
        keywords: &["saving", "goal"],
        reply: "You can set up savings goals in your dashboard to track your progress towards \
                financial targets!",
    },
    KeywordGroup {
        keywords: &["donation", "donate", "pad"],
        reply: "Our donation feature helps you contribute to meaningful causes. Every donation \
                makes a difference!",
    },
    KeywordGroup {
        keywords: &["thank", "thanks"],
        reply: "You're welcome! Is there anything else I can help you with?",
    },
    KeywordGroup {
        keywords: &["bye", "goodbye"],
        reply: "Goodbye! Feel free to ask if you need more help with remittances!",
    },
];

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct ChatRequest {
    #[validate(length(max = 1000))]
    #[schema(example = "How much does a transfer cost?")]
    pub user_input: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: &'static str,
}

fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn word_matches(word: &str, keyword: &str) -> bool {
    if word == keyword {
        return true;
    }
    if let Some(stem) = word.strip_suffix('s') {
        if stem == keyword {
            return true;
        }
    }
    keyword.len() >= 4 && word.starts_with(keyword)
}

fn contains_keyword(words: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    if parts.is_empty() || parts.len() > words.len() {
        return false;
    }
    words.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(word, part)| word_matches(word, part))
    })
}

/// Pick the reply for a message
pub fn reply(input: &str) -> &'static str {
    let words = tokenize(input);
    if words.is_empty() {
        return EMPTY_INPUT_REPLY;
    }
    GROUPS
        .iter()
        .find(|group| group.keywords.iter().any(|kw| contains_keyword(&words, kw)))
        .map(|group| group.reply)
        .unwrap_or(FALLBACK_REPLY)
}
