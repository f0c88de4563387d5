//! Default print stylesheet injected before browser rendering.

/// Print-only rules that strip decorative backgrounds and shadows.
///
/// Document-defined `@media print` rules still apply; these only set a floor.
pub const PRINT_STYLES: &str = r#"<style media="print">
@media print {
  body {
    background: white !important;
    background-color: white !important;
    background-image: none !important;
  }

  * {
    box-shadow: none !important;
    text-shadow: none !important;
  }

  @page {
    margin: 0.5in;
  }
}
</style>"#;

/// Returns `html` with [`PRINT_STYLES`] inserted.
///
/// Placement, first match wins:
/// 1. immediately before the first `</head>` (case-insensitive)
/// 2. right after the `>` closing the first `<body` tag
/// 3. at the very start
pub fn inject_print_styles(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`
    let lowered = html.to_ascii_lowercase();

    if let Some(idx) = lowered.find("</head>") {
        return format!("{}{}\n{}", &html[..idx], PRINT_STYLES, &html[idx..]);
    }

    if let Some(body_idx) = lowered.find("<body") {
        if let Some(close) = html[body_idx..].find('>') {
            let insert_at = body_idx + close + 1;
            return format!(
                "{}\n{}\n{}",
                &html[..insert_at],
                PRINT_STYLES,
                &html[insert_at..]
            );
        }
    }

    format!("{}\n{}", PRINT_STYLES, html)
}
