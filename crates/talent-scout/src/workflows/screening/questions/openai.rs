use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{QuestionRequest, QuestionSource, SourceUnavailable};

const SYSTEM_PROMPT: &str = "You are a technical interviewer for TalentScout, a technology \
recruitment agency. Your role is to generate relevant and challenging technical questions \
based on candidates' tech stacks. Focus on fundamental understanding, practical application, \
and problem-solving abilities.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;
const MIN_QUESTION_CHARS: usize = 10;

/// Question source backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiQuestionSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiQuestionSource {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, request: &QuestionRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(request),
                },
            ],
        }
    }

    async fn complete(&self, request: &QuestionRequest) -> Result<String, SourceUnavailable> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceUnavailable::Status(status.as_u16()));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| self.transport_error(err))?;

        Ok(payload
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn transport_error(&self, err: reqwest::Error) -> SourceUnavailable {
        if err.is_timeout() {
            SourceUnavailable::Timeout(self.timeout)
        } else {
            SourceUnavailable::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl QuestionSource for OpenAiQuestionSource {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn questions(
        &self,
        request: &QuestionRequest,
    ) -> Result<Vec<String>, SourceUnavailable> {
        let content = tokio::time::timeout(self.timeout, self.complete(request))
            .await
            .map_err(|_| SourceUnavailable::Timeout(self.timeout))??;

        let questions = parse_questions(&content, request.count);
        if questions.is_empty() {
            return Err(SourceUnavailable::EmptyResponse);
        }
        Ok(questions)
    }
}

fn build_prompt(request: &QuestionRequest) -> String {
    format!(
        "Generate exactly {count} technical interview questions about {technology} for a \
         candidate with {years} years of professional experience.\n\
         Provide {descriptor}.\n\
         Cover fundamental understanding, practical application, problem-solving and best \
         practices.\n\
         Format the output as a numbered list with one question per line. Each question must \
         end with a question mark. Do not add any other text.",
        count = request.count,
        technology = request.technology,
        years = request.experience_years,
        descriptor = request.difficulty.descriptor(),
    )
}

/// Split a completion into questions, one per line.
///
/// List markers (`1.`, `2)`, `-`, `*`) and markdown emphasis are stripped; a line
/// counts only if it has letters, a `?`, and more than ten characters.
pub fn parse_questions(content: &str, limit: usize) -> Vec<String> {
    content
        .lines()
        .map(strip_list_marker)
        .map(|line| line.trim_matches('*').trim())
        .filter(|line| {
            line.len() > MIN_QUESTION_CHARS
                && line.contains('?')
                && line.chars().any(char::is_alphabetic)
        })
        .take(limit.max(1))
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        return line[digits..]
            .strip_prefix(['.', ')', ':'])
            .map(str::trim)
            .unwrap_or(line);
    }
    line.strip_prefix(['-', '*', '•'])
        .map(str::trim)
        .unwrap_or(line)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::personalization::DifficultyLevel;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn request() -> QuestionRequest {
        QuestionRequest {
            technology: "Rust".to_string(),
            experience_years: 6,
            difficulty: DifficultyLevel::Hard,
            count: 3,
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        format!("http://{addr}/v1")
    }

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let source = OpenAiQuestionSource::new(
            "sk-test",
            "http://127.0.0.1:9/v1/",
            "gpt-test",
            Duration::from_secs(1),
        )
        .expect("client");

        assert_eq!(source.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn parse_questions_strips_markers_and_noise() {
        let content = "Here are your questions:\n\
                       1. How does the borrow checker reason about lifetimes?\n\
                       2) What is the difference between Box<dyn Trait> and impl Trait?\n\
                       \n\
                       - **When would you use Pin?**\n\
                       3. Short?\n\
                       4. Explain interior mutability.";
        let questions = parse_questions(content, 5);
        assert_eq!(
            questions,
            vec![
                "How does the borrow checker reason about lifetimes?",
                "What is the difference between Box<dyn Trait> and impl Trait?",
                "When would you use Pin?",
            ]
        );
    }

    #[test]
    fn parse_questions_honours_limit() {
        let content = "1. What is a trait object?\n2. What is a lifetime bound?\n3. What is a closure capture?";
        assert_eq!(parse_questions(content, 2).len(), 2);
    }

    #[test]
    fn prompt_embeds_technology_and_difficulty() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("about Rust"));
        assert!(prompt.contains("6 years"));
        assert!(prompt.contains(DifficultyLevel::Hard.descriptor()));
        assert!(prompt.contains("exactly 3"));
    }

    #[tokio::test]
    async fn successful_completion_is_parsed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-test");
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "choices": [{
                        "message": {
                            "content": "1. What does Send guarantee?\n2. What does Sync guarantee?\n3. Why is Rc not Send?"
                        }
                    }]
                }))
            }),
        );
        let base = spawn(router).await;
        let source =
            OpenAiQuestionSource::new("sk-test", &base, "gpt-test", Duration::from_secs(5))
                .expect("client builds");

        let questions = source.questions(&request()).await.expect("questions");
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[2], "Why is Rc not Send?");
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let base = spawn(router).await;
        let timeout = Duration::from_millis(100);
        let source = OpenAiQuestionSource::new("sk-test", &base, "gpt-test", timeout)
            .expect("client builds");

        assert_eq!(
            source.questions(&request()).await,
            Err(SourceUnavailable::Timeout(timeout))
        );
    }

    #[tokio::test]
    async fn error_status_and_empty_replies_are_unavailable() {
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            )
            .route(
                "/empty/chat/completions",
                post(|| async {
                    Json(json!({ "choices": [{ "message": { "content": "Sure! Happy to help." } }] }))
                }),
            );
        let base = spawn(router).await;

        let limited = OpenAiQuestionSource::new("sk-test", &base, "gpt-test", Duration::from_secs(5))
            .expect("client builds");
        assert_eq!(
            limited.questions(&request()).await,
            Err(SourceUnavailable::Status(429))
        );

        let empty_base = base.replace("/v1", "/empty");
        let empty =
            OpenAiQuestionSource::new("sk-test", &empty_base, "gpt-test", Duration::from_secs(5))
                .expect("client builds");
        assert_eq!(
            empty.questions(&request()).await,
            Err(SourceUnavailable::EmptyResponse)
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let source = OpenAiQuestionSource::new(
            "sk-test",
            &format!("http://{addr}/v1"),
            "gpt-test",
            Duration::from_secs(2),
        )
        .expect("client builds");
        assert!(matches!(
            source.questions(&request()).await,
            Err(SourceUnavailable::Transport(_))
        ));
    }
}
