pub fn build_summary_prompt(content: &str) -> String {
    format!(
        r#"You are an analyst.
Given CONTENT below, produce:
1) TL;DR: 5-8 bullets.
2) Executive Summary (300-600 words).
3) Deep Dive: structure, arguments, rhetorical techniques; 5-10 bullets.

Return sections titled exactly: TL;DR, Executive Summary, Deep Dive.
Put each title on its own line and do not leave blank lines inside a section.

CONTENT:
{}"#,
        content
    )
}

pub fn build_claims_prompt(content: &str, k: usize) -> String {
    format!(
        r#"Extract up to {k} checkable factual claims from the text below.

INSTRUCTIONS:
1. A claim is a single factual assertion that could be verified with a web search
2. Skip opinions, predictions and rhetorical questions
3. For each claim propose 1-3 short web search queries
4. Output ONLY valid JSON, nothing else

SCHEMA:
[
  {{"text": "the claim", "snippet": "short quote from the text", "proposed_queries": ["query one", "query two"]}}
]

TEXT:
{content}

JSON OUTPUT:"#
    )
}

pub fn build_assessment_prompt(claim: &str, snippets: &[String]) -> String {
    let evidence = if snippets.is_empty() {
        "(no search results)".to_string()
    } else {
        snippets
            .iter()
            .enumerate()
            .map(|(i, s)| format!("[{}] {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Assess the following claim based only on these search snippets.

CLAIM: {claim}

SNIPPETS:
{evidence}

Score how strongly the snippets SUPPORT the claim and how strongly they CONTRADICT it, each between 0.0 and 1.0.
Output ONLY a JSON object:
{{"support_score": 0.0, "contradiction_score": 0.0, "rationale": "one or two sentences"}}"#
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON."#,
        invalid_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_prompt_numbers_snippets() {
        let prompt = build_assessment_prompt(
            "Water boils at 100C",
            &["NIST — boiling point".to_string(), "BBC — sea level".to_string()],
        );

        assert!(prompt.contains("CLAIM: Water boils at 100C"));
        assert!(prompt.contains("[1] NIST — boiling point"));
        assert!(prompt.contains("[2] BBC — sea level"));
    }

    #[test]
    fn test_assessment_prompt_without_snippets() {
        let prompt = build_assessment_prompt("x", &[]);
        assert!(prompt.contains("(no search results)"));
    }

    #[test]
    fn test_summary_prompt_names_sections() {
        let prompt = build_summary_prompt("hello");
        assert!(prompt.contains("TL;DR, Executive Summary, Deep Dive"));
        assert!(prompt.ends_with("hello"));
    }
}
