//! Markup strategy: the message wrapped in a fixed-size HTML page.
//!
//! The page dimensions match the physical card (A5 landscape) so the
//! provider's HTML renderer does not reflow. The message is escaped by
//! minijinja's HTML auto-escaping; the `.html` template name activates it.

use minijinja::{Environment, context};

use crate::artifact::BackArtifact;
use crate::error::ArtifactError;

const BACK_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<style>
  @page { size: 210mm 148mm; margin: 0; }
  body {
    width: 210mm;
    height: 148mm;
    font-family: Helvetica, Arial, sans-serif;
    padding: 40px;
    margin: 0;
    box-sizing: border-box;
  }
  .message {
    font-size: 14pt;
    line-height: 1.6;
    color: #333;
    white-space: pre-wrap;
  }
</style>
</head>
<body>
<div class="message">{{ message }}</div>
</body>
</html>
"#;

pub fn render(message: &str) -> Result<BackArtifact, ArtifactError> {
    let mut env = Environment::new();
    env.add_template("back.html", BACK_TEMPLATE)
        .map_err(|e| ArtifactError::Markup(e.to_string()))?;
    let html = env
        .get_template("back.html")
        .and_then(|t| t.render(context! { message }))
        .map_err(|e| ArtifactError::Markup(e.to_string()))?;

    Ok(BackArtifact {
        bytes: html.into_bytes(),
        media_type: "text/html".to_string(),
        filename: "back.html".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_embedded() {
        let artifact = render("Feliz cumpleaños!").expect("rendered");
        let html = String::from_utf8(artifact.bytes).expect("utf8");
        assert!(html.contains("Feliz cumpleaños!"));
        assert!(html.contains("210mm"));
    }

    #[test]
    fn test_message_html_escaped() {
        let artifact = render("<script>alert(1)</script> & more").expect("rendered");
        let html = String::from_utf8(artifact.bytes).expect("utf8");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = render("same message").expect("first");
        let b = render("same message").expect("second");
        assert_eq!(a.bytes, b.bytes);
    }
}
