/// Cut `text` after its first `max_tokens` whitespace-separated tokens.
///
/// Returns `text` unchanged when it has `max_tokens` tokens or fewer. The
/// cut never splits a token and drops the whitespace that preceded the
/// first discarded token.
#[must_use]
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> &str {
    let mut tokens = 0_usize;
    let mut in_token = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_token = false;
        } else if !in_token {
            in_token = true;
            tokens += 1;
            if tokens > max_tokens {
                return text[..idx].trim_end();
            }
        }
    }
    text
}
