/// Clean admin-entered text using the ammonia library.
///
/// Whitelist-based: safe inline tags (like <b>, <code>) survive, while
/// <script>, <iframe> and event-handler attributes are stripped. Applied to
/// question text, explanations and career descriptions before they are stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
