/// Wrap the user's question the way the panel expects to receive it
pub fn frame_user_query(message: &str) -> String {
    format!(
        "Process this user query: {}\nIf research is needed, collaborate with the financial expert and policy expert.",
        message.trim()
    )
}

/// Shorten text for log lines without splitting a character
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_keeps_the_question() {
        let framed = frame_user_query("  How long do solar panels last?\n");
        assert!(framed.starts_with("Process this user query: How long do solar panels last?\n"));
        assert!(framed.ends_with("financial expert and policy expert."));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("☀☀☀", 2), "☀☀…");
        assert_eq!(preview("short", 10), "short");
    }
}
