//! Rendered portal pages.

/// Page as a browser renders a raw JSON response.
pub fn json_page(payload: &str) -> String {
    let escaped = payload
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        r#"<html><head></head><body><pre style="word-wrap: break-word; white-space: pre-wrap;">{}</pre></body></html>"#,
        escaped
    )
}

/// Portal login form, shown when the session is not logged in.
pub fn login_page() -> String {
    r#"<html><head><title>Apex Fusion</title></head><body>
        <form>
            <input id="index-login-username" type="text">
            <input id="index-login-password" type="password">
            <button class="af-sign-in">Sign In</button>
        </form>
    </body></html>"#
        .to_string()
}

/// Error page served for unknown portal URLs.
pub fn not_found_page() -> String {
    "<html><body><h1>404 Not Found</h1></body></html>".to_string()
}
