//! Maps a feedback outcome to the text/image content returned to the agent.

use proto::{FeedbackOutcome, OutcomeKind, ToolResult};

pub(crate) const CANCELLED_REPLY: &str = "⏹️ The user cancelled the operation.";
pub(crate) const ENDED_REPLY: &str =
    "🛑 The user ended the conversation. No further confirmation calls are needed.";

/// Tool-specific lines of the reply.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Wording {
    Approval,
    Checkpoint,
}

impl Wording {
    fn approved(self) -> &'static str {
        match self {
            Wording::Approval => "✅ The user is satisfied. Task complete.",
            Wording::Checkpoint => "✅ The user confirmed the current direction.",
        }
    }

    fn instructions(self, text: &str) -> String {
        let text = if text.is_empty() {
            "see the attached images"
        } else {
            text
        };
        match self {
            Wording::Approval => format!(
                "🔄 The user requested changes: {text}\n\
                 Revise your output according to these instructions."
            ),
            Wording::Checkpoint => format!("🔄 User choice/instruction: {text}"),
        }
    }
}

/// Builds the tool result for `outcome`.
pub(crate) fn format_outcome(outcome: &FeedbackOutcome, wording: Wording) -> ToolResult {
    match outcome.kind {
        OutcomeKind::Cancelled => ToolResult::success(CANCELLED_REPLY),
        OutcomeKind::ConversationEnded => ToolResult::success(ENDED_REPLY),
        _ if outcome.is_approval() && outcome.images.is_empty() => {
            ToolResult::success(wording.approved())
        }
        _ => {
            let mut text = wording.instructions(&outcome.text);
            if !outcome.images.is_empty() {
                text.push_str(&format!(
                    "\n\n🖼️ The user attached {} image(s).",
                    outcome.images.len()
                ));
            }
            ToolResult::success(text).with_images(&outcome.images)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::{ContentPart, ImageAttachment};

    fn png() -> ImageAttachment {
        ImageAttachment::from_data_url("data:image/png;base64,Zm9v").expect("valid png")
    }

    #[test]
    fn cancelled_and_ended_replies_carry_no_images() {
        let cancelled = format_outcome(&FeedbackOutcome::cancelled(), Wording::Approval);
        assert_eq!(cancelled.text(), Some(CANCELLED_REPLY));
        assert_eq!(cancelled.content.len(), 1);

        let ended = format_outcome(&FeedbackOutcome::conversation_ended(), Wording::Checkpoint);
        assert_eq!(ended.text(), Some(ENDED_REPLY));
        assert_eq!(ended.content.len(), 1);
    }

    #[test]
    fn plain_approval_and_timeout_share_the_approval_reply() {
        let approved = format_outcome(&FeedbackOutcome::approved(Vec::new()), Wording::Approval);
        let timed_out = format_outcome(&FeedbackOutcome::timed_out(), Wording::Approval);
        assert_eq!(approved, timed_out);
        assert_eq!(approved.text(), Some("✅ The user is satisfied. Task complete."));
        assert!(!approved.is_error);
    }

    #[test]
    fn adjustment_forwards_text_then_images() {
        let outcome = FeedbackOutcome::adjusted("use snake_case", vec![png()]);
        let result = format_outcome(&outcome, Wording::Approval);

        let text = result.text().expect("text part");
        assert!(text.starts_with("🔄 The user requested changes: use snake_case"));
        assert!(text.ends_with("The user attached 1 image(s)."));
        assert_eq!(
            result.content[1],
            ContentPart::Image {
                data: "Zm9v".to_string(),
                mime_type: "image/png".to_string()
            }
        );
    }

    #[test]
    fn approval_with_images_is_forwarded_as_instructions() {
        let outcome = FeedbackOutcome::approved(vec![png(), png()]);
        let result = format_outcome(&outcome, Wording::Checkpoint);

        assert_eq!(result.content.len(), 3);
        let text = result.text().expect("text part");
        assert!(text.starts_with("🔄 User choice/instruction: see the attached images"));
        assert!(text.contains("2 image(s)"));
    }
}
