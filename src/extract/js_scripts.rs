//! In-page evaluation scripts.
//!
//! All DOM reading happens inside the page via these scripts; the Rust side
//! only consumes their JSON-serialized results. Selector parameters are
//! embedded JSON-encoded so arbitrary selector strings cannot break out of
//! the script.

use super::review::ReviewStrategy;
use super::serp::SerpStrategy;

/// JSON-encode a string for safe embedding in a script
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

/// JSON-encode an optional attribute name (`null` when text content is used)
fn js_opt_string(s: Option<&str>) -> String {
    match s {
        Some(s) => js_string(s),
        None => String::from("null"),
    }
}

/// Collect SERP result candidates under one strategy tier.
///
/// Pushes raw candidates with nullable fields and stops walking the page
/// once `max` candidates carrying both a link and a title have been seen —
/// later containers are never evaluated. Acceptance itself (skip, cap,
/// position numbering) is decided on the Rust side.
pub fn serp_collect_script(strategy: &SerpStrategy, max: usize) -> String {
    format!(
        r#"
        (() => {{
            const containers = Array.from(document.querySelectorAll({container}));
            const out = [];
            let accepted = 0;
            for (const el of containers) {{
                if (accepted >= {max}) break;
                const link = el.querySelector({link});
                const title = el.querySelector({title});
                const desc = el.querySelector({description});
                const href = link ? link.getAttribute('href') : null;
                const candidate = {{
                    url: href,
                    title: title ? title.textContent.trim() : null,
                    description: desc ? desc.textContent.trim() : ''
                }};
                if (candidate.url && candidate.title) {{
                    accepted += 1;
                }}
                out.push(candidate);
            }}
            return out;
        }})()
        "#,
        container = js_string(strategy.container),
        link = js_string(strategy.link),
        title = js_string(strategy.title),
        description = js_string(strategy.description),
    )
}

/// Collect review candidates under one strategy tier.
///
/// Same contract as [`serp_collect_script`]: raw candidates with nullable
/// fields, early stop once `max` candidates carrying review text are seen.
pub fn review_collect_script(strategy: &ReviewStrategy, max: usize) -> String {
    format!(
        r#"
        (() => {{
            const containers = Array.from(document.querySelectorAll({container}));
            const out = [];
            let accepted = 0;
            const pick = (el, sel, attr) => {{
                if (!sel) return null;
                const node = el.querySelector(sel);
                if (!node) return null;
                if (attr) return node.getAttribute(attr);
                return node.textContent.trim();
            }};
            for (const el of containers) {{
                if (accepted >= {max}) break;
                const candidate = {{
                    reviewer: pick(el, {reviewer}, {reviewer_attr}),
                    rating_raw: pick(el, {rating}, {rating_attr}),
                    text: pick(el, {text}, null),
                    date_raw: pick(el, {date}, {date_attr})
                }};
                if (candidate.text && candidate.text.length > 0) {{
                    accepted += 1;
                }}
                out.push(candidate);
            }}
            return out;
        }})()
        "#,
        container = js_string(strategy.container),
        reviewer = js_string(strategy.reviewer),
        reviewer_attr = js_opt_string(strategy.reviewer_attr),
        rating = js_string(strategy.rating),
        rating_attr = js_opt_string(strategy.rating_attr),
        text = js_string(strategy.text),
        date = js_string(strategy.date),
        date_attr = js_opt_string(strategy.date_attr),
    )
}

/// Extract the content-bearing shape of a competitor page in one pass:
/// ordered heading lists, leading paragraphs, word count, image count, and
/// internal/external link counts (internal = same hostname).
pub fn competitor_content_script(max_paragraphs: usize) -> String {
    format!(
        r#"
        (() => {{
            const texts = (sel) => Array.from(document.querySelectorAll(sel))
                .map(el => el.textContent.trim())
                .filter(t => t.length > 0);
            const h1 = texts('h1');
            const h2 = texts('h2');
            const h3 = texts('h3');
            const paragraphs = texts('p').slice(0, {max_paragraphs});
            const bodyText = document.body ? document.body.innerText : '';
            const wordCount = bodyText.split(/\s+/).filter(w => w.length > 0).length;
            let internal = 0;
            let external = 0;
            for (const anchor of document.querySelectorAll('a[href]')) {{
                try {{
                    const resolved = new URL(anchor.getAttribute('href'), window.location.href);
                    if (resolved.hostname === window.location.hostname) {{
                        internal += 1;
                    }} else {{
                        external += 1;
                    }}
                }} catch (e) {{
                    // unparsable href, skip
                }}
            }}
            return {{
                h1: h1,
                h2: h2,
                h3: h3,
                paragraphs: paragraphs,
                word_count: wordCount,
                image_count: document.images.length,
                internal_link_count: internal,
                external_link_count: external
            }};
        }})()
        "#
    )
}

/// Scroll the page down by `step` pixels and report the resulting offset,
/// so the caller can detect when scrolling stops advancing.
pub fn scroll_step_script(step: u32) -> String {
    format!(
        r"
        (() => {{
            window.scrollBy(0, {step});
            return window.scrollY;
        }})()
        "
    )
}
