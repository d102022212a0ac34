//! State - the append-only transcript of one in-flight request
//!
//! Every pipeline node appends turns; nothing is ever removed or reordered.
//! Stage findings are looked up by producer tag, never by position, so a
//! pipeline keeps working when an upstream stage contributes nothing.

use opsmesh_llm::{Message, MessageRole};

/// Append-only turn sequence owned by one request execution
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    turns: Vec<Message>,
}

impl PipelineState {
    /// Start a state from one user request
    #[must_use]
    pub fn from_request(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Message::user(text)],
        }
    }

    /// Start a state from already-normalized turns
    #[must_use]
    pub fn from_turns(turns: Vec<Message>) -> Self {
        Self { turns }
    }

    /// Append one turn
    pub fn push(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    /// All turns, in append order
    #[must_use]
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Content of the most recent user turn, empty if there is none
    #[must_use]
    pub fn latest_user_text(&self) -> &str {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == MessageRole::User)
            .map(|t| t.content.as_str())
            .unwrap_or("")
    }

    /// Content of the most recent turn tagged with `producer`, empty if absent
    #[must_use]
    pub fn find_by_name(&self, producer: &str) -> &str {
        self.turns
            .iter()
            .rev()
            .find(|t| t.name.as_deref() == Some(producer))
            .map(|t| t.content.as_str())
            .unwrap_or("")
    }

    /// Content of the most recent assistant turn, empty if there is none
    #[must_use]
    pub fn final_text(&self) -> &str {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == MessageRole::Assistant)
            .map(|t| t.content.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_user_text() {
        let mut state = PipelineState::from_request("Count all servers");
        state.push(Message::assistant("routing...").with_name("supervisor"));
        assert_eq!(state.latest_user_text(), "Count all servers");

        let empty = PipelineState::default();
        assert_eq!(empty.latest_user_text(), "");
    }

    #[test]
    fn test_find_by_name_takes_latest() {
        let mut state = PipelineState::from_request("q");
        state.push(Message::assistant("old findings").with_name("graph_collector"));
        state.push(Message::assistant("new findings").with_name("graph_collector"));
        state.push(Message::assistant("context").with_name("context_enhancer"));

        assert_eq!(state.find_by_name("graph_collector"), "new findings");
        assert_eq!(state.find_by_name("context_enhancer"), "context");
        assert_eq!(state.find_by_name("missing"), "");
    }

    #[test]
    fn test_final_text_is_last_assistant_turn() {
        let mut state = PipelineState::from_request("q");
        assert_eq!(state.final_text(), "");

        state.push(Message::assistant("stage output").with_name("graph_collector"));
        state.push(Message::assistant("the answer"));
        assert_eq!(state.final_text(), "the answer");
    }

    #[test]
    fn test_turns_preserve_order() {
        let mut state = PipelineState::from_request("q");
        state.push(Message::assistant("a"));
        state.push(Message::assistant("b"));

        let contents: Vec<&str> = state.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q", "a", "b"]);
    }
}
