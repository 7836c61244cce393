//! Prompt templates for the three LLM stages.

use crate::state::ResearchState;

/// Current date in a human-readable form, injected into the query-writer
/// prompt so searches prefer recent material.
pub fn get_current_date() -> String {
    chrono::Local::now().format("%B %d, %Y").to_string()
}

/// System prompt for the query-generation stage.
pub fn query_writer_instructions(research_topic: &str, current_date: &str) -> String {
    format!(
        "Your goal is to generate a targeted web search query.

<CONTEXT>
Current date: {current_date}
Please ensure your queries account for the most current information available as of this date.
</CONTEXT>

<TOPIC>
{research_topic}
</TOPIC>

<FORMAT>
Format your response as a JSON object with ALL three of these exact keys:
   - \"query\": The actual search query string
   - \"rationale\": Brief explanation of why this query is relevant
</FORMAT>

<EXAMPLE>
Example output:
{{
    \"query\": \"machine learning transformer architecture explained\",
    \"rationale\": \"Understanding the fundamental structure of transformer models\"
}}
</EXAMPLE>

Provide your response in JSON format:"
    )
}

/// User message for the query-generation stage.
pub const QUERY_WRITER_REQUEST: &str = "Generate a query for web search:";

/// System prompt for the summarization stage.
pub const SUMMARIZER_INSTRUCTIONS: &str = "\
<GOAL>
Generate a high-quality summary of the provided context.
</GOAL>

<REQUIREMENTS>
When creating a NEW summary:
1. Highlight the most relevant information related to the user topic from the search results
2. Ensure a coherent flow of information

When EXTENDING an existing summary:
1. Read the existing summary and new search results carefully
2. Compare the new information with the existing summary
3. For each piece of new information:
    a. If it's related to existing points, integrate it into the relevant paragraph
    b. If it's entirely new but relevant, add a new paragraph with a smooth transition
    c. If it's not relevant to the user topic, skip it
4. Ensure all additions are relevant to the user's topic
5. Verify that your final output differs from the existing summary
</REQUIREMENTS>

<FORMATTING>
Start directly with the updated summary, without preamble or titles. Do not use XML tags in the output.
</FORMATTING>";

/// User message for the summarization stage: create a summary on the first
/// iteration, update the existing one afterwards, always against the most
/// recent search results.
pub fn summarize_human_message(state: &ResearchState) -> String {
    let most_recent = state
        .web_research_results
        .last()
        .map(String::as_str)
        .unwrap_or_default();

    if state.running_summary.is_empty() {
        format!(
            "<Context> \n {} \n <Context>\
             Create a Summary using the Context on this topic: \n <User Input> \n {} \n <User Input>\n\n",
            most_recent, state.research_topic
        )
    } else {
        format!(
            "<Existing Summary> \n {} \n <Existing Summary>\n\n\
             <New Context> \n {} \n <New Context>\
             Update the Existing Summary with the New Context on this topic: \n <User Input> \n {} \n <User Input>\n\n",
            state.running_summary, most_recent, state.research_topic
        )
    }
}

/// System prompt for the reflection stage.
pub fn reflection_instructions(research_topic: &str) -> String {
    format!(
        "You are an expert research assistant analyzing a summary about {research_topic}.

<GOAL>
1. Identify knowledge gaps or areas that need deeper exploration
2. Generate a follow-up question that would help expand your understanding
3. Focus on technical details, implementation specifics, or emerging trends that weren't fully covered
</GOAL>

<REQUIREMENTS>
Ensure the follow-up question is self-contained and includes necessary context for web search.
</REQUIREMENTS>

<FORMAT>
Format your response as a JSON object with these exact keys:
- \"knowledge_gap\": Describe what information is missing or needs clarification
- \"follow_up_query\": Write a specific question to address this gap
</FORMAT>

<EXAMPLE>
Example output:
{{
    \"knowledge_gap\": \"The summary lacks information about performance metrics and benchmarks\",
    \"follow_up_query\": \"What are typical performance benchmarks and metrics used to evaluate this technology?\"
}}
</EXAMPLE>

Provide your analysis in JSON format:"
    )
}

/// User message for the reflection stage.
pub fn reflection_human_message(running_summary: &str) -> String {
    format!(
        "Reflect on our existing knowledge: \n === \n {running_summary}, \n === \n \
         And now identify a knowledge gap and generate a follow-up web search query:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_writer_includes_topic_and_date() {
        let prompt = query_writer_instructions("rust atomics", "January 01, 2026");
        assert!(prompt.contains("rust atomics"));
        assert!(prompt.contains("January 01, 2026"));
        assert!(prompt.contains("\"query\""));
    }

    #[test]
    fn test_summarize_message_create_vs_update() {
        let mut state = ResearchState::new("topic");
        state.web_research_results.push("results one".to_string());
        let create = summarize_human_message(&state);
        assert!(create.contains("Create a Summary"));
        assert!(create.contains("results one"));

        state.running_summary = "existing".to_string();
        state.web_research_results.push("results two".to_string());
        let update = summarize_human_message(&state);
        assert!(update.contains("Update the Existing Summary"));
        assert!(update.contains("existing"));
        // Only the most recent results block is referenced.
        assert!(update.contains("results two"));
        assert!(!update.contains("results one"));
    }

    #[test]
    fn test_reflection_includes_topic() {
        let prompt = reflection_instructions("graph databases");
        assert!(prompt.contains("graph databases"));
        assert!(prompt.contains("\"follow_up_query\""));
    }
}
