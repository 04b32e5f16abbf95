//! Prompt construction for error diagnosis.

use crate::config::PromptMode;

/// Replaced with the raw exception message in site templates.
pub const EXCEPTION_MESSAGE_MARKER: &str = "%<exception_message>s";

/// Replaced with the newline-joined stack frames in site templates.
pub const APPLICATION_STACK_MARKER: &str = "%<application_stack>s";

/// Build the prompt sent to the backend.
///
/// In site-template mode with a non-blank template the markers are substituted
/// literally and the result is returned as is. Every other case produces the
/// built-in structured prompt.
pub fn build_prompt(
    exception_message: &str,
    app_stack: &[String],
    mode: PromptMode,
    site_template: Option<&str>,
) -> String {
    let stack = app_stack.join("\n");

    if let (PromptMode::SiteTemplate, Some(template)) = (mode, site_template)
        && !template.trim().is_empty()
    {
        return template
            .replace(EXCEPTION_MESSAGE_MARKER, exception_message)
            .replace(APPLICATION_STACK_MARKER, &stack);
    }

    format!(
        r#"You are diagnosing an application runtime failure.
Return:
1) Most likely root cause (1-2 sentences)
2) Suggested fix steps (max 5 bullets)
3) Confidence (low/medium/high)

Exception:
{exception_message}

Application stack:
{stack}
"#
    )
}
