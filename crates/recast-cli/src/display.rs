//! Plain-text rendering of display payloads for a terminal.

use unicode_width::UnicodeWidthStr;

use recast_core::Verdict;
use recast_session::{DisplayPayload, ErrorPosition};

pub const DEFAULT_WIDTH: usize = 78;

/// Render a payload as lines of at most `width` columns.
pub fn render(payload: &DisplayPayload, width: usize) -> String {
    let mut out = String::new();
    match payload {
        DisplayPayload::ShowError {
            position,
            original_sentence,
            hint,
            feedback,
        } => {
            if let Some(feedback) = feedback {
                push_wrapped(&mut out, &format!("✓ {feedback}"), width);
                out.push('\n');
            }
            push_heading(&mut out, &position_label(position), width);
            push_wrapped(&mut out, &format!("  {original_sentence}"), width);
            push_wrapped(&mut out, hint, width);
        }
        DisplayPayload::ShowFeedback {
            verdict, message, ..
        } => {
            let mark = match verdict {
                Verdict::Correct => "✓",
                Verdict::Incorrect => "✗",
            };
            push_wrapped(&mut out, &format!("{mark} {message}"), width);
        }
        DisplayPayload::ShowFinalPracticePrompt {
            position,
            explanation,
            reveal,
            retry_message,
        } => {
            if let Some(retry) = retry_message {
                push_wrapped(&mut out, &format!("✗ {retry}"), width);
                return out;
            }
            push_heading(&mut out, &position_label(position), width);
            push_wrapped(&mut out, explanation, width);
            out.push('\n');
            push_wrapped(&mut out, &format!("Your sentence: {}", reveal.original_sentence), width);
            push_wrapped(&mut out, &format!("Correct version: {}", reveal.corrected_sentence), width);
            push_wrapped(&mut out, &format!("Explanation: {}", reveal.explanation_detail), width);
            out.push('\n');
            push_wrapped(&mut out, "Type the corrected sentence to continue.", width);
        }
        DisplayPayload::ShowCompletion {
            message, feedback, ..
        } => {
            if let Some(feedback) = feedback {
                push_wrapped(&mut out, &format!("✓ {feedback}"), width);
                out.push('\n');
            }
            push_heading(&mut out, message, width);
        }
        DisplayPayload::ShowRewritePrompt {
            message,
            original_essay,
        } => {
            push_wrapped(&mut out, message, width);
            out.push('\n');
            for line in original_essay.lines() {
                push_wrapped(&mut out, &format!("│ {line}"), width);
            }
        }
    }
    out
}

fn position_label(position: &ErrorPosition) -> String {
    format!(
        "Error {} of {} (attempt {})",
        position.index + 1,
        position.total,
        position.attempt
    )
}

fn push_heading(out: &mut String, title: &str, width: usize) {
    push_wrapped(out, title, width);
    let rule = UnicodeWidthStr::width(title).min(width);
    out.push_str(&"─".repeat(rule));
    out.push('\n');
}

/// Greedy word wrap by display width. Words wider than `width` get a line
/// of their own.
fn push_wrapped(out: &mut String, text: &str, width: usize) {
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            let w = UnicodeWidthStr::width(word);
            if line_width > 0 && line_width + 1 + w > width {
                out.push_str(&line);
                out.push('\n');
                line.clear();
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            } else if line.is_empty() && paragraph.starts_with("  ") {
                line.push_str("  ");
                line_width += 2;
            }
            line.push_str(word);
            line_width += w;
        }
        out.push_str(&line);
        out.push('\n');
    }
}
