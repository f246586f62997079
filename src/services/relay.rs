use super::upstream::{CompletionResponse, ContentPart, ImageUrl, MessageContent, UpstreamMessage};

pub const EMPTY_MESSAGE: &str = "Message cannot be empty";
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request.";

/// Text entry first; with an image, a second multi-part entry repeating the
/// same text. Both are sent.
pub fn build_messages(message: &str, image_url: Option<&str>) -> Vec<UpstreamMessage> {
    let mut messages = vec![UpstreamMessage {
        role: "user",
        content: MessageContent::Text(message.to_string()),
    }];

    if let Some(url) = image_url.map(str::trim).filter(|u| !u.is_empty()) {
        messages.push(UpstreamMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: message.to_string() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.to_string() },
                },
            ]),
        });
    }

    messages
}

/// First choice's trimmed content, or `None` when upstream gave no choices.
pub fn extract_reply(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
}
