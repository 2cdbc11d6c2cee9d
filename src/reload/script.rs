//! Client-side reload script, injected into served HTML.

/// Minimal reload client: connect, reload on any message, retry on drop.
const RELOAD_JS: &str = r#"<script>
(function () {
    var connect = function () {
        var ws = new WebSocket("ws://" + location.hostname + ":{{port}}");
        ws.onmessage = function () { location.reload(); };
        ws.onclose = function () { setTimeout(connect, 1000); };
    };
    connect();
})();
</script>"#;

/// Inject the reload script before the closing `</body>` tag.
///
/// Falls back to appending when no `</body>` exists; browsers accept
/// trailing scripts.
pub fn inject_reload_script(content: &[u8], ws_port: u16) -> Vec<u8> {
    let script = RELOAD_JS.replace("{{port}}", &ws_port.to_string());
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + script_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(script_bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injects_before_closing_body() {
        let html = b"<html><body><p>hi</p></body></html>";
        let out = String::from_utf8(inject_reload_script(html, 35729)).unwrap();

        assert!(out.contains(":35729"));
        let script_at = out.find("<script>").unwrap();
        let body_close_at = out.find("</body>").unwrap();
        assert!(script_at < body_close_at);
        assert!(out.ends_with("</body></html>"));
    }

    #[test]
    fn test_case_insensitive_body_tag() {
        let html = b"<HTML><BODY>x</BODY></HTML>";
        let out = String::from_utf8(inject_reload_script(html, 9000)).unwrap();
        assert!(out.ends_with("</BODY></HTML>"));
        assert!(out.contains("<script>"));
    }

    #[test]
    fn test_appends_without_body_tag() {
        let html = b"<p>fragment</p>";
        let out = String::from_utf8(inject_reload_script(html, 9000)).unwrap();
        assert!(out.starts_with("<p>fragment</p>"));
        assert!(out.ends_with("</script>"));
    }
}
