//! Built-in prompts.

use async_trait::async_trait;

use crate::prompts::{PromptDescriptor, PromptRenderer};
use crate::registry::CapabilityRegistry;
use crate::schema::{opt_str_arg, str_arg, Arguments, FieldType, InputShape};
use crate::types::{Content, McpError, McpResult, PromptMessage};

use super::files::safe_segment;

pub(super) fn register(registry: &mut CapabilityRegistry) -> McpResult<()> {
    registry.register_prompt(
        PromptDescriptor::new("review_code", ReviewCode)
            .with_description("Ask for a review of a piece of code")
            .with_input(
                InputShape::new()
                    .required("code", FieldType::String, "The code to review")
                    .optional("language", FieldType::String, "Programming language"),
            ),
    )?;

    registry.register_prompt(
        PromptDescriptor::new("explain_resource", ExplainResource)
            .with_description("Ask for an explanation of a resource")
            .with_input(InputShape::new().required(
                "uri",
                FieldType::String,
                "URI of the resource to explain",
            )),
    )?;

    registry.register_prompt(
        PromptDescriptor::new("summarize_log", SummarizeLog)
            .with_description("Ask for a summary of a log file")
            .with_input(InputShape::new().required(
                "filename",
                FieldType::String,
                "Name of a file under logs/",
            )),
    )?;

    Ok(())
}

struct ReviewCode;

#[async_trait]
impl PromptRenderer for ReviewCode {
    async fn render(&self, args: Arguments) -> McpResult<Vec<PromptMessage>> {
        let code = str_arg(&args, "code")?;
        let language = opt_str_arg(&args, "language").unwrap_or("");

        let text = format!(
            "Please review this {lang}code. Point out bugs, unclear naming and \
             missing error handling, and suggest concrete fixes.\n\n```{language}\n{code}\n```",
            lang = if language.is_empty() {
                String::new()
            } else {
                format!("{language} ")
            },
        );
        Ok(vec![PromptMessage::user(Content::text(text))])
    }
}

struct ExplainResource;

#[async_trait]
impl PromptRenderer for ExplainResource {
    async fn render(&self, args: Arguments) -> McpResult<Vec<PromptMessage>> {
        let uri = str_arg(&args, "uri")?;
        if !uri.contains("://") {
            return Err(McpError::invalid_argument("uri", "expected scheme://path"));
        }

        Ok(vec![
            PromptMessage::user(Content::text(format!(
                "Explain what the resource {uri} contains and how it is used."
            ))),
            PromptMessage::user(Content::link(uri, uri)),
        ])
    }
}

struct SummarizeLog;

#[async_trait]
impl PromptRenderer for SummarizeLog {
    async fn render(&self, args: Arguments) -> McpResult<Vec<PromptMessage>> {
        let filename = safe_segment("filename", str_arg(&args, "filename")?)?;
        let uri = format!("log://{filename}");

        Ok(vec![
            PromptMessage::user(Content::text(format!(
                "Summarize the log file {filename}. List errors and warnings first, \
                 then notable events in order."
            ))),
            PromptMessage::user(Content::link(uri, filename)),
        ])
    }
}
