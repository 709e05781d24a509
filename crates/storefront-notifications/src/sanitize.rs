use crate::error::{NotificationError, Result};
use crate::models::CreateNotificationRequest;

pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Remove HTML tags and decode entities.
///
/// Only `<` followed by a letter, `/` or `!` and closed by a later `>` counts
/// as a tag; any other `<` is ordinary text.
pub fn strip_html_tags(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];
        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

        match tail.find('>') {
            Some(end) if opens_tag => rest = &tail[end + 1..],
            _ => {
                result.push('<');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);

    html_escape::decode_html_entities(&result).trim().to_string()
}

fn truncate_chars(text: &mut String, max_chars: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
}

/// Relative app routes and http(s) links are allowed as call-to-action targets
pub fn is_safe_action_url(url: &str) -> bool {
    let url = url.trim();
    if url.starts_with("//") {
        return false;
    }
    url.starts_with('/') || url.starts_with("https://") || url.starts_with("http://")
}

/// Strip markup, trim and bound the display text of a create request
pub fn sanitize_request(mut request: CreateNotificationRequest) -> CreateNotificationRequest {
    request.user_ids.retain_non_blank();

    request.title = strip_html_tags(&request.title);
    truncate_chars(&mut request.title, MAX_TITLE_CHARS);

    request.message = strip_html_tags(&request.message);
    truncate_chars(&mut request.message, MAX_MESSAGE_CHARS);

    if let Some(ref url) = request.action_url {
        if !is_safe_action_url(url) {
            log::warn!("Dropping unsafe notification action url: {}", url);
            request.action_url = None;
        }
    }

    if let Some(ref mut text) = request.action_text {
        *text = strip_html_tags(text);
        truncate_chars(text, MAX_TITLE_CHARS);
    }
    if request.action_text.as_deref() == Some("") {
        request.action_text = None;
    }

    request
}

/// A request needs at least one recipient and a title once sanitized
pub fn validate_request(request: &CreateNotificationRequest) -> Result<()> {
    if request.user_ids.is_empty() {
        return Err(NotificationError::InvalidRequest(
            "at least one recipient is required".to_string(),
        ));
    }
    if request.title.is_empty() {
        return Err(NotificationError::InvalidRequest(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}
