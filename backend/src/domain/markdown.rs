//! Markdown to sanitised HTML.
//!
//! Content is parsed as GitHub-flavoured markdown with raw HTML passed
//! through, then cleaned against an allow-list: the sanitiser's safe
//! defaults plus media embeds (`iframe`, `audio`, `video`, `source`).
//! Every image is rendered with `loading="lazy"`.

use std::collections::HashSet;
use std::sync::Arc;

use ammonia::Builder;
use pulldown_cmark::{Options, Parser, html};

const EMBED_TAGS: [&str; 4] = ["iframe", "audio", "video", "source"];
const IFRAME_ATTRIBUTES: [&str; 6] = ["src", "title", "width", "height", "allowfullscreen", "allow"];
const AUDIO_ATTRIBUTES: [&str; 2] = ["src", "controls"];
const VIDEO_ATTRIBUTES: [&str; 5] = ["src", "controls", "width", "height", "poster"];
const SOURCE_ATTRIBUTES: [&str; 2] = ["src", "type"];

/// HTML produced by [`MarkdownRenderer::render`]; safe to embed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHtml(String);

impl RenderedHtml {
    /// Borrow the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Stateless markdown renderer; clones share the sanitiser configuration.
///
/// # Examples
/// ```
/// use fictures::domain::MarkdownRenderer;
///
/// let html = MarkdownRenderer::new().render("**hi** <script>alert(1)</script>");
/// assert!(html.as_str().contains("<strong>hi</strong>"));
/// assert!(!html.as_str().contains("script"));
/// ```
#[derive(Clone)]
pub struct MarkdownRenderer {
    sanitizer: Arc<Builder<'static>>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Renderer with the embed allow-list.
    #[must_use]
    pub fn new() -> Self {
        let mut sanitizer = Builder::default();
        sanitizer
            .add_tags(EMBED_TAGS)
            .add_tag_attributes("iframe", IFRAME_ATTRIBUTES)
            .add_tag_attributes("audio", AUDIO_ATTRIBUTES)
            .add_tag_attributes("video", VIDEO_ATTRIBUTES)
            .add_tag_attributes("source", SOURCE_ATTRIBUTES)
            .set_tag_attribute_value("img", "loading", "lazy");
        Self {
            sanitizer: Arc::new(sanitizer),
        }
    }

    /// Render `content` to sanitised HTML.
    #[must_use]
    pub fn render(&self, content: &str) -> RenderedHtml {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES;
        let mut unsafe_html = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut unsafe_html, Parser::new_ext(content, options));
        RenderedHtml(self.sanitizer.clean(&unsafe_html).to_string())
    }

    /// Tags that may appear in rendered output.
    #[must_use]
    pub fn allowed_tags(&self) -> HashSet<&'static str> {
        self.sanitizer.clone_tags()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::new()
    }

    /// Names of every opening tag in `html`.
    fn tag_names(html: &str) -> Vec<String> {
        html.split('<')
            .skip(1)
            .filter(|chunk| !chunk.starts_with('/') && !chunk.starts_with('!'))
            .map(|chunk| {
                chunk
                    .chars()
                    .take_while(char::is_ascii_alphanumeric)
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .filter(|name| !name.is_empty())
            .collect()
    }

    #[rstest]
    #[case("<script>alert(1)</script>")]
    #[case("<style>body{display:none}</style>")]
    #[case("<object data=\"x.swf\"></object><embed src=\"x.swf\">")]
    #[case("<form action=\"/steal\"><input type=\"password\"></form>")]
    #[case("<svg onload=\"alert(1)\"><circle/></svg>")]
    #[case("<math><mi>x</mi></math><marquee>hi</marquee>")]
    #[case("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n\n~~old~~[^1]\n\n[^1]: note")]
    fn output_never_leaves_the_allow_list(renderer: MarkdownRenderer, #[case] content: &str) {
        let html = renderer.render(content);
        let allowed = renderer.allowed_tags();
        for tag in tag_names(html.as_str()) {
            assert!(allowed.contains(tag.as_str()), "unexpected <{tag}> in {}", html.as_str());
        }
    }

    #[rstest]
    #[case("<img src=\"x.png\" onerror=\"alert(1)\">", "onerror")]
    #[case("<a href=\"javascript:alert(1)\">x</a>", "javascript:")]
    #[case("[x](javascript:alert(1))", "javascript:")]
    #[case("<script>alert('boom')</script>", "boom")]
    #[case("<p style=\"color:red\" onclick=\"x()\">hi</p>", "onclick")]
    fn active_content_is_stripped(
        renderer: MarkdownRenderer,
        #[case] content: &str,
        #[case] forbidden: &str,
    ) {
        let html = renderer.render(content);
        assert!(!html.as_str().contains(forbidden), "{}", html.as_str());
    }

    #[rstest]
    fn images_are_lazy_loaded(renderer: MarkdownRenderer) {
        let html = renderer.render("![Mountain](https://example.com/m.jpg)");
        assert!(html.as_str().contains("loading=\"lazy\""), "{}", html.as_str());
        assert!(html.as_str().contains("alt=\"Mountain\""));
    }

    #[rstest]
    fn eager_image_loading_is_overridden(renderer: MarkdownRenderer) {
        let html = renderer.render("<img src=\"https://example.com/a.png\" loading=\"eager\">");
        assert!(html.as_str().contains("loading=\"lazy\""));
        assert!(!html.as_str().contains("eager"));
    }

    #[rstest]
    fn iframe_keeps_only_embed_attributes(renderer: MarkdownRenderer) {
        let html = renderer.render(
            "<iframe src=\"https://www.youtube.com/embed/abc\" title=\"Clip\" width=\"560\" \
             height=\"315\" allow=\"autoplay\" allowfullscreen srcdoc=\"<b>x</b>\" \
             onload=\"x()\" style=\"border:0\"></iframe>",
        );
        let out = html.as_str();
        for kept in ["src=", "title=", "width=", "height=", "allow=", "allowfullscreen"] {
            assert!(out.contains(kept), "missing {kept} in {out}");
        }
        for dropped in ["srcdoc", "onload", "style"] {
            assert!(!out.contains(dropped), "kept {dropped} in {out}");
        }
    }

    #[rstest]
    fn media_elements_survive(renderer: MarkdownRenderer) {
        let html = renderer.render(
            "<video controls width=\"320\" poster=\"https://example.com/p.jpg\">\
             <source src=\"https://example.com/v.mp4\" type=\"video/mp4\"></video>\n\n\
             <audio controls src=\"https://example.com/a.mp3\"></audio>",
        );
        let out = html.as_str();
        assert!(out.contains("<video"));
        assert!(out.contains("poster="));
        assert!(out.contains("<source"));
        assert!(out.contains("type=\"video/mp4\""));
        assert!(out.contains("<audio"));
    }

    #[rstest]
    fn gfm_tables_and_strikethrough_render(renderer: MarkdownRenderer) {
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.as_str().contains("<table>"));
        assert!(html.as_str().contains("<del>gone</del>"));
    }
}
