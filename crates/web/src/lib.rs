//! Feedback page rendering.
//!
//! [`render`] turns a prompt and theme into a single self-contained HTML
//! document. Styling and client script are embedded from `assets/`; the
//! script talks to the session through `POST /submit` only.

use proto::Theme;

const PAGE_CSS: &str = include_str!("../assets/page.css");
const PAGE_JS: &str = include_str!("../assets/page.js");

// ─── Public API ────────────────────────────────────────────

/// Renders the feedback page for `prompt`.
///
/// The prompt is escaped before it is embedded. `Theme::Auto` is resolved
/// by the browser via `prefers-color-scheme`; `Light` and `Dark` are forced.
pub fn render(prompt: &str, theme: Theme) -> String {
    let prompt = escape_html(prompt);
    let theme = theme.as_str();

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme-preference="{theme}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Agent feedback</title>
  <style>{PAGE_CSS}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Agent feedback</h1>
    </div>
    <div class="content">
      <span class="prompt-label">Agent output</span>
      <div class="prompt-text" id="promptText">{prompt}</div>
      <div class="input-area" id="inputArea">
        <textarea id="textInput" placeholder="Type adjustment instructions, or paste images..."></textarea>
        <div class="images-preview" id="imagesPreview"></div>
      </div>
      <div class="helper-text">
        Paste images (<span class="kbd" id="pasteKey">Ctrl+V</span>)
        &middot; Submit (<span class="kbd" id="submitKey">Ctrl+Enter</span>)
        &middot; End conversation (<span class="kbd">Esc</span>)
        &middot; Leave empty if you are satisfied
      </div>
      <div class="footer">
        <button class="btn-end" id="endBtn">End conversation</button>
        <button class="btn-cancel" id="cancelBtn">Cancel</button>
        <button class="btn-confirm" id="confirmBtn">Confirm</button>
      </div>
    </div>
  </div>
  <script>{PAGE_JS}</script>
</body>
</html>"#
    )
}

/// Escapes text for embedding in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

// ─── Tests ─────────────────────────────────────────────────
