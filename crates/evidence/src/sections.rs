//! Splitting the summarizer's free-form reply into its three sections.
//!
//! Grammar, applied independently per section name:
//!
//! ```text
//! <name> [whitespace] [":"] [whitespace] "\n" <body> ("\n\n" | end of text)
//! ```
//!
//! The name matches case-insensitively anywhere in the text (first
//! occurrence wins), so markdown headings such as `## TL;DR` work too. The
//! body is the shortest non-empty run up to the next blank line, trimmed.
//! Windows line endings are normalized first.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

pub const TLDR: &str = "TL;DR";
pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";
pub const DEEP_DIVE: &str = "Deep Dive";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySections {
    pub tldr: Vec<String>,
    pub executive_summary: String,
    pub deep_dive: String,
}

pub fn split_sections(raw: &str) -> SummarySections {
    let text = raw.replace("\r\n", "\n");

    SummarySections {
        tldr: tldr_lines(&section(&text, TLDR)),
        executive_summary: section(&text, EXECUTIVE_SUMMARY),
        deep_dive: section(&text, DEEP_DIVE),
    }
}

/// Body of the section called `name`, or an empty string when absent.
pub fn section(text: &str, name: &str) -> String {
    let pattern = format!(r"{}\s*:?\s*\n(.+?)(?:\n\n|$)", regex::escape(name));

    let Ok(re) = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
    else {
        return String::new();
    };

    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

/// One entry per non-empty line, with leading `-` bullet markers removed.
pub fn tldr_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(|line| line.trim().trim_start_matches(['-', ' ']).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
