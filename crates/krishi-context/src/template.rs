// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assistant prompt.

const TEMPLATE: &str = "\
You are {agent_name}, an advanced AI agricultural assistant specialized in helping farmers.

Return responses in clean, structured HTML format with proper formatting:
- Use <h3>, <h4> for headings
- Use <p> for paragraphs
- Use <ul>, <li> for lists
- Use <strong> for emphasis
- Use <br> for line breaks when needed

Current Weather Information:
{weather_context}

Conversation History (use if relevant):
{history}

User Query: {query}

Provide practical, actionable advice based on the weather conditions and farming best practices.
Your response:
";

/// Fills the assistant template with the three prompt inputs.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    agent_name: String,
}

impl PromptTemplate {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
        }
    }

    /// Substitutes each placeholder once, in a single pass, so text inside
    /// the inputs that looks like a placeholder is left alone.
    pub fn render(&self, weather_context: &str, history: &str, query: &str) -> String {
        let mut out = String::with_capacity(
            TEMPLATE.len() + weather_context.len() + history.len() + query.len(),
        );
        let mut rest = TEMPLATE;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let Some(end) = tail.find('}') else {
                out.push_str(tail);
                return out;
            };
            let value = match &tail[1..end] {
                "agent_name" => self.agent_name.as_str(),
                "weather_context" => weather_context,
                "history" => history,
                "query" => query,
                _ => &tail[..=end],
            };
            out.push_str(value);
            rest = &tail[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new("Krishi Mitra")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_all_slots() {
        let prompt = PromptTemplate::default().render(
            "<p>Sunny</p>",
            "HUMAN: hi\nAI: hello",
            "Should I irrigate today?",
        );
        assert!(prompt.starts_with("You are Krishi Mitra, an advanced AI agricultural assistant"));
        assert!(prompt.contains("Current Weather Information:\n<p>Sunny</p>\n"));
        assert!(prompt.contains("Conversation History (use if relevant):\nHUMAN: hi\nAI: hello\n"));
        assert!(prompt.contains("User Query: Should I irrigate today?\n"));
        assert!(prompt.trim_end().ends_with("Your response:"));
        assert!(!prompt.contains("{query}"));
    }

    #[test]
    fn braces_in_inputs_are_not_expanded() {
        let prompt = PromptTemplate::new("Mitra").render("w", "h", "what is {history}?");
        assert!(prompt.contains("User Query: what is {history}?"));
        assert!(prompt.starts_with("You are Mitra,"));
    }
}
