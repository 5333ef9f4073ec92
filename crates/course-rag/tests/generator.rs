use anyhow::Result;
use async_trait::async_trait;
use course_rag::{
    errors::{AgentError, AgentResult},
    generator::{GenerationRequest, ResponseGenerator, APOLOGY},
    models::tool::Tool,
    providers::{
        configs::{AnthropicProviderConfig, GenerationParams, OpenAiProviderConfig, ProviderConfig},
        factory::get_provider,
    },
    sanitizer::{ResponseSanitizer, SanitizerConfig},
    tool::{ToolExecutor, ToolRegistry},
};
use serde_json::{json, Value};
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stand-in for the course search index
#[derive(Default)]
struct CourseTools {
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl ToolExecutor for CourseTools {
    async fn execute_tool(&self, name: &str, arguments: Value) -> AgentResult<String> {
        self.executed.lock().unwrap().push(name.to_string());
        match name {
            "search_course_content" => Ok(format!(
                "[MCP: Build Rich-Context AI Apps - Lesson 4]\nResults for {}",
                arguments["query"].as_str().unwrap_or_default()
            )),
            "get_course_outline" => Ok("Lesson 4: Creating an MCP Client".to_string()),
            other => Err(AgentError::ToolNotFound(other.to_string())),
        }
    }
}

impl ToolRegistry for CourseTools {
    fn tool_definitions(&self) -> Vec<Value> {
        vec![
            Tool::new(
                "search_course_content",
                "Search course materials with smart course name matching and lesson filtering",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "course_name": {"type": "string"},
                        "lesson_number": {"type": "integer"}
                    },
                    "required": ["query"]
                }),
            )
            .to_declaration(),
            Tool::new(
                "get_course_outline",
                "Get the lesson list of a course",
                json!({
                    "type": "object",
                    "properties": {"course_name": {"type": "string"}},
                    "required": ["course_name"]
                }),
            )
            .to_declaration(),
        ]
    }
}

fn generator(config: ProviderConfig) -> Result<ResponseGenerator> {
    let sanitizer = ResponseSanitizer::new(SanitizerConfig::default())?;
    Ok(ResponseGenerator::new(get_provider(config)?, sanitizer))
}

async fn request_bodies(server: &MockServer) -> Result<Vec<Value>> {
    let requests = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .map(|request| serde_json::from_slice(&request.body).map_err(anyhow::Error::from))
        .collect()
}

#[tokio::test]
async fn test_anthropic_tool_round_trip() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "tool_use", "id": "toolu_01", "name": "search_course_content", "input": {"query": "MCP client"}},
                {"type": "tool_use", "id": "toolu_02", "name": "get_course_outline", "input": {"course_name": "MCP"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 40}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Lesson 4 builds an MCP client."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 300, "output_tokens": 12}
        })))
        .mount(&server)
        .await;

    let generator = generator(ProviderConfig::Anthropic(AnthropicProviderConfig {
        host: server.uri(),
        api_key: "test_api_key".to_string(),
        model: "claude-sonnet-4-20250514".to_string(),
        params: GenerationParams::default(),
    }))?;
    let tools = CourseTools::default();

    let answer = generator
        .generate_with_registry("Which lesson builds an MCP client?", None, &tools)
        .await;

    assert_eq!(answer, "Lesson 4 builds an MCP client.");
    assert_eq!(
        *tools.executed.lock().unwrap(),
        vec!["search_course_content", "get_course_outline"]
    );

    let bodies = request_bodies(&server).await?;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["tools"], json!(tools.tool_definitions()));
    assert_eq!(bodies[0]["tool_choice"], json!({"type": "auto"}));

    let finalize = &bodies[1];
    assert!(finalize.get("tools").is_none());
    assert!(finalize.get("tool_choice").is_none());
    assert_eq!(finalize["system"], bodies[0]["system"]);

    let messages = finalize["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"][0]["type"], "tool_use");
    assert_eq!(messages[1]["content"][0]["input"], json!({"query": "MCP client"}));
    assert_eq!(messages[2]["role"], "user");
    let results = messages[2]["content"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["type"], "tool_result");
    assert_eq!(results[0]["tool_use_id"], "toolu_01");
    assert_eq!(results[1]["tool_use_id"], "toolu_02");
    assert_eq!(results[1]["content"], "Lesson 4: Creating an MCP Client");
    Ok(())
}

#[tokio::test]
async fn test_openai_routes_and_sanitizes() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_1", "type": "function", "function": {"name": "search_course_content", "arguments": "{\"query\": \"MCP\"}"}},
                        {"id": "call_2", "type": "function", "function": {"name": "unknown_tool", "arguments": "{}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Let me look at the search results before answering.\n\nThe course materials show that lesson 4 introduces MCP clients and servers in detail."
                },
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 410, "completion_tokens": 60, "total_tokens": 470}
        })))
        .mount(&server)
        .await;

    let generator = generator(ProviderConfig::OpenAi(OpenAiProviderConfig {
        host: server.uri(),
        api_key: "test_api_key".to_string(),
        reasoning_model: "deepseek-ai/DeepSeek-R1".to_string(),
        tool_model: "deepseek-ai/DeepSeek-V3".to_string(),
        params: GenerationParams::default(),
    }))?;
    let tools = CourseTools::default();
    let declarations = tools.tool_definitions();

    let request = GenerationRequest::new("What is MCP?")
        .with_history("User: hi\nAssistant: Hello! Ask me about a course.")
        .with_tools(&declarations)
        .with_executor(&tools);
    let answer = generator.generate(&request).await;

    assert_eq!(
        answer,
        "The course materials show that lesson 4 introduces MCP clients and servers in detail."
    );

    let bodies = request_bodies(&server).await?;
    assert_eq!(bodies.len(), 2);

    assert_eq!(bodies[0]["model"], "deepseek-ai/DeepSeek-V3");
    assert_eq!(bodies[0]["tool_choice"], "auto");
    assert_eq!(bodies[0]["tools"][1]["function"]["name"], "get_course_outline");
    let system = bodies[0]["messages"][0]["content"].as_str().unwrap();
    assert!(system.ends_with("Previous conversation:\nUser: hi\nAssistant: Hello! Ask me about a course."));

    let finalize = &bodies[1];
    assert_eq!(finalize["model"], "deepseek-ai/DeepSeek-R1");
    assert!(finalize.get("tools").is_none());
    let messages = finalize["messages"].as_array().unwrap();
    // system, user, assistant tool calls, one message per tool result
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2]["tool_calls"][0]["function"]["arguments"], "{\"query\": \"MCP\"}");
    assert_eq!(messages[3]["role"], "tool");
    assert_eq!(messages[3]["tool_call_id"], "call_1");
    assert_eq!(messages[4]["tool_call_id"], "call_2");
    assert_eq!(
        messages[4]["content"],
        "Tool execution error: Tool not found: unknown_tool"
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_provider_yields_apology() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let generator = generator(ProviderConfig::Anthropic(AnthropicProviderConfig {
        host: server.uri(),
        api_key: "test_api_key".to_string(),
        model: "claude-sonnet-4-20250514".to_string(),
        params: GenerationParams::default(),
    }))?;

    let answer = generator.generate(&GenerationRequest::new("hello")).await;
    assert_eq!(answer, APOLOGY);
    Ok(())
}
