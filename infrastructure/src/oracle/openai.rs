//! OpenAI-compatible chat completions oracle.
//!
//! Both oracle operations are single chat completion calls with one function
//! tool and a forced `tool_choice`, so the model can only answer with the
//! tool's JSON arguments:
//!
//! | Operation        | Tool                  | Arguments                                   |
//! |------------------|-----------------------|---------------------------------------------|
//! | `select_members` | `select_member_names` | `{selected_names: [string]}`                |
//! | `validate`       | `report_answer`       | `{found, answer_text, source_number}`       |

use async_trait::async_trait;
use member_qa_application::ports::answer_oracle::{AnswerOracle, OracleError};
use member_qa_domain::{Candidate, OracleVerdict, PromptTemplate};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

pub const SELECT_MEMBERS_TOOL: &str = "select_member_names";
pub const REPORT_ANSWER_TOOL: &str = "report_answer";

/// Sentinel some models put in `answer_text` instead of `found = false`.
const NO_ANSWER_SENTINEL: &str = "NO_ANSWER";

pub struct OpenAiOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiOracle {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            temperature: 0.1,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Run one forced tool call and return the parsed tool arguments.
    async fn call_tool(&self, body: Value, tool: &str) -> Result<Value, OracleError> {
        let mut request = self.client.post(self.completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout
            } else {
                OracleError::Unavailable(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), &detail));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(format!("Failed to parse response: {}", e)))?;

        extract_tool_arguments(&response_json, tool)
    }

    fn request_body(&self, system: &str, user: &str, tool: Value, tool_name: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "tools": [tool],
            "tool_choice": {"type": "function", "function": {"name": tool_name}},
        })
    }
}

#[async_trait]
impl AnswerOracle for OpenAiOracle {
    async fn select_members(
        &self,
        question: &str,
        earlier: &[String],
        names: &[String],
    ) -> Result<Vec<String>, OracleError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        debug!(
            names = names.len(),
            earlier = earlier.len(),
            model = %self.model,
            "Asking oracle to select members"
        );
        let body = self.request_body(
            PromptTemplate::resolver_system(),
            &PromptTemplate::resolver_prompt(question, earlier, names),
            select_members_tool(),
            SELECT_MEMBERS_TOOL,
        );
        let args = self.call_tool(body, SELECT_MEMBERS_TOOL).await?;
        parse_selection(&args)
    }

    async fn validate(
        &self,
        question: &str,
        candidates: &[Candidate],
    ) -> Result<OracleVerdict, OracleError> {
        if candidates.is_empty() {
            return Ok(OracleVerdict::NoAnswer);
        }
        debug!(candidates = candidates.len(), model = %self.model, "Asking oracle to validate");
        let body = self.request_body(
            PromptTemplate::validator_system(),
            &PromptTemplate::validator_prompt(question, candidates),
            report_answer_tool(),
            REPORT_ANSWER_TOOL,
        );
        let args = self.call_tool(body, REPORT_ANSWER_TOOL).await?;
        parse_verdict(&args)
    }
}

fn select_members_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": SELECT_MEMBERS_TOOL,
            "description": "Return the member names from the provided list that the question is about.",
            "parameters": {
                "type": "object",
                "properties": {
                    "selected_names": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Names copied exactly from the provided list; empty if none apply."
                    }
                },
                "required": ["selected_names"]
            }
        }
    })
}

fn report_answer_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": REPORT_ANSWER_TOOL,
            "description": "Report whether one of the candidate messages answers the question.",
            "parameters": {
                "type": "object",
                "properties": {
                    "found": {"type": "boolean"},
                    "answer_text": {
                        "type": "string",
                        "description": "Text quoted from the supporting message; empty when not found."
                    },
                    "source_number": {"type": "integer", "minimum": 1}
                },
                "required": ["found"]
            }
        }
    })
}

pub(crate) fn map_status(status: u16, detail: &str) -> OracleError {
    let detail = member_qa_domain::util::truncate_str(detail.trim(), 200);
    match status {
        408 => OracleError::Timeout,
        429 => OracleError::RateLimited,
        500..=599 => OracleError::Unavailable(format!("HTTP {}: {}", status, detail)),
        _ => OracleError::Rejected(format!("HTTP {}: {}", status, detail)),
    }
}

/// Pull the arguments of the forced tool call out of a completion response.
pub(crate) fn extract_tool_arguments(response: &Value, tool: &str) -> Result<Value, OracleError> {
    let message = response
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .ok_or_else(|| OracleError::Malformed("response has no choices".to_string()))?;

    let call = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .and_then(|calls| {
            calls.iter().find(|c| {
                c.get("function")
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
                    == Some(tool)
            })
        })
        .ok_or_else(|| OracleError::Malformed(format!("no `{}` tool call in response", tool)))?;

    let arguments = call
        .get("function")
        .and_then(|f| f.get("arguments"))
        .ok_or_else(|| OracleError::Malformed("tool call has no arguments".to_string()))?;

    // Arguments arrive as a JSON-encoded string; accept an inline object too.
    match arguments {
        Value::String(raw) => serde_json::from_str(raw)
            .map_err(|e| OracleError::Malformed(format!("tool arguments are not JSON: {}", e))),
        Value::Object(_) => Ok(arguments.clone()),
        _ => Err(OracleError::Malformed("tool arguments have an unexpected type".to_string())),
    }
}

pub(crate) fn parse_selection(args: &Value) -> Result<Vec<String>, OracleError> {
    let names = args
        .get("selected_names")
        .and_then(Value::as_array)
        .ok_or_else(|| OracleError::Malformed("`selected_names` missing".to_string()))?;

    Ok(names
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect())
}

pub(crate) fn parse_verdict(args: &Value) -> Result<OracleVerdict, OracleError> {
    let answer_text = args
        .get("answer_text")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    let found = match args.get("found") {
        Some(Value::Bool(found)) => *found,
        Some(_) => return Err(OracleError::Malformed("`found` must be a boolean".to_string())),
        None => !answer_text.is_empty(),
    };

    if !found || answer_text.is_empty() || answer_text.eq_ignore_ascii_case(NO_ANSWER_SENTINEL) {
        return Ok(OracleVerdict::NoAnswer);
    }

    let source_number = match args.get("source_number") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(other) => {
            warn!(value = %other, "Ignoring unreadable source_number");
            None
        }
    };

    Ok(OracleVerdict::Answer {
        answer_text: answer_text.to_string(),
        source_number,
    })
}
