//! In-page text extraction script.

/// Returned by the script when the document has neither `<main>` nor `<body>`.
pub const NO_TEXT_SENTINEL: &str = "No text found";

/// Extracts rendered text from the live document.
///
/// Prefers `<main>`. Otherwise renders a copy of `<body>` with `script` and
/// `style` subtrees removed in an off-screen host so `innerText` still
/// reflects layout, then removes the host again.
pub(crate) const TEXT_EXTRACTION_SCRIPT: &str = r#"
(() => {
  const main = document.querySelector('main');
  if (main) {
    return main.innerText.trim();
  }

  const body = document.querySelector('body');
  if (body) {
    const copy = body.cloneNode(true);
    copy.querySelectorAll('script, style').forEach((node) => node.remove());

    const host = document.createElement('div');
    host.setAttribute('aria-hidden', 'true');
    host.style.cssText = 'position:absolute;left:-100000px;top:0;width:100%;';
    host.appendChild(copy);
    document.documentElement.appendChild(host);
    try {
      const text = copy.innerText || copy.textContent || '';
      return text.trim();
    } finally {
      host.remove();
    }
  }

  return '__NO_TEXT__';
})()
"#;

/// The script with the sentinel substituted in.
pub(crate) fn text_extraction_script() -> String {
    TEXT_EXTRACTION_SCRIPT.replace("__NO_TEXT__", NO_TEXT_SENTINEL)
}
