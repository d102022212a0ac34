//! Shared fakes for core tests

use opsmesh_llm::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, ToolCall,
    ToolCompletionRequest, ToolCompletionResponse,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted provider response for the tool-loop path
pub enum ScriptedTurn {
    /// Respond with tool calls and no content
    Calls(Vec<ToolCall>),
    /// Respond with final text and no tool calls
    Text(String),
}

/// Provider fake that replays a fixed script.
///
/// `complete` pops from the plain-completion script; `complete_with_tools`
/// pops from the tool script. An exhausted script answers with empty text.
pub struct ScriptedProvider {
    completions: Mutex<VecDeque<String>>,
    tool_turns: Mutex<VecDeque<ScriptedTurn>>,
    fail: bool,
    /// Requests seen by `complete`, for prompt assertions
    pub seen_prompts: Mutex<Vec<String>>,
    /// Message transcripts seen by `complete_with_tools`, per call
    pub seen_tool_requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn completing(responses: Vec<&str>) -> Self {
        Self {
            completions: Mutex::new(responses.into_iter().map(String::from).collect()),
            tool_turns: Mutex::new(VecDeque::new()),
            fail: false,
            seen_prompts: Mutex::new(Vec::new()),
            seen_tool_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tool_script(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            completions: Mutex::new(VecDeque::new()),
            tool_turns: Mutex::new(turns.into()),
            fail: false,
            seen_prompts: Mutex::new(Vec::new()),
            seen_tool_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scripts(turns: Vec<ScriptedTurn>, responses: Vec<&str>) -> Self {
        Self {
            completions: Mutex::new(responses.into_iter().map(String::from).collect()),
            tool_turns: Mutex::new(turns.into()),
            fail: false,
            seen_prompts: Mutex::new(Vec::new()),
            seen_tool_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            completions: Mutex::new(VecDeque::new()),
            tool_turns: Mutex::new(VecDeque::new()),
            fail: true,
            seen_prompts: Mutex::new(Vec::new()),
            seen_tool_requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> opsmesh_llm::Result<CompletionResponse> {
        if self.fail {
            return Err(opsmesh_llm::Error::Api("scripted failure".to_string()));
        }
        if let Some(last) = request.messages.last() {
            self.seen_prompts.lock().unwrap().push(last.content.clone());
        }
        let content = self
            .completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(CompletionResponse {
            content,
            usage: None,
            finish_reason: Some("stop".to_string()),
            model: "scripted".to_string(),
        })
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> opsmesh_llm::Result<ToolCompletionResponse> {
        if self.fail {
            return Err(opsmesh_llm::Error::Api("scripted failure".to_string()));
        }
        self.seen_tool_requests
            .lock()
            .unwrap()
            .push(request.request.messages.clone());
        let turn = self.tool_turns.lock().unwrap().pop_front();
        let response = match turn {
            Some(ScriptedTurn::Calls(tool_calls)) => ToolCompletionResponse {
                content: None,
                tool_calls,
                usage: None,
                finish_reason: Some("tool_calls".to_string()),
                model: "scripted".to_string(),
            },
            Some(ScriptedTurn::Text(text)) => ToolCompletionResponse {
                content: Some(text),
                tool_calls: vec![],
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: "scripted".to_string(),
            },
            None => ToolCompletionResponse {
                content: Some(String::new()),
                tool_calls: vec![],
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: "scripted".to_string(),
            },
        };
        Ok(response)
    }
}

/// Graph store fake returning the same rows for every query
pub struct FixedGraphStore {
    pub rows: Vec<serde_json::Value>,
}

#[async_trait::async_trait]
impl opsmesh_tools::GraphStore for FixedGraphStore {
    async fn execute(
        &self,
        _query: &str,
        _params: serde_json::Value,
    ) -> opsmesh_tools::Result<Vec<serde_json::Value>> {
        Ok(self.rows.clone())
    }
}

/// Vector index fake returning no matches
pub struct EmptyVectorIndex;

#[async_trait::async_trait]
impl opsmesh_tools::VectorIndex for EmptyVectorIndex {
    async fn similarity_search(
        &self,
        _query: &str,
        _top_k: usize,
    ) -> opsmesh_tools::Result<Vec<opsmesh_tools::VectorMatch>> {
        Ok(vec![])
    }
}
