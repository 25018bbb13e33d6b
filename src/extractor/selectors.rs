use std::sync::LazyLock;

use scraper::Selector;

/// How text is pulled out of an element matched by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Descendant text, skipping noise subtrees.
    Text,
    /// The value of an attribute (meta tags carry their payload in `content`).
    Attr(&'static str),
}

pub struct Candidate {
    pub source: &'static str,
    pub selector: Selector,
    pub extract: Extract,
}

/// Elements whose subtrees never count as article text.
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "header", "footer", "nav", "aside",
];

/// Most to least specific article body containers.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "div.article-content",
    "div.entry-content",
    "div.post-content",
    "div.content",
    "main",
    "section.article-body",
    "div#articleBody",
    "div.story-content",
    "div.content-area",
    "div.story-body",
    "div.text",
    "div.article-body",
    "div.news-article",
    "div.blog-post",
    "div.page-content",
    "div#main-content",
    "div.article__content",
    "div.content__article-body",
    "div#bodyContent",
    "div#contentBody",
    "div.contentWrapper",
    "div.content-post",
    "div.post-article",
    "div.body-copy",
    "div.node-article",
];

const TITLE_SELECTORS: &[&str] = &[
    "title",
    r#"meta[name="title"]"#,
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
    "h1.headline",
    "h1.entry-title",
    "h1.article-title",
    "h1.page-title",
    "h1.post-title",
    "h1.news-title",
    "h1.title",
    "h1.story-title",
    "h2.headline",
    "div.article-header h1",
    "div.post-header h1",
    "div.story-header h1",
    "header.article-header h1",
    "header.entry-header h1",
    "header.post-header h1",
    "header.page-header h1",
    "header.story-header h1",
    "header h1",
    "header h2",
    "h1",
    "h2",
];

/// Standard description tags first, then the Sailthru publisher tail.
const DESCRIPTION_SELECTORS: &[&str] = &[
    r#"meta[name="description"]"#,
    r#"meta[property="og:description"]"#,
    r#"meta[name="twitter:description"]"#,
    r#"meta[name="sailthru.description"]"#,
    r#"meta[name="sailthru.title"]"#,
    r#"meta[name="sailthru.image.full"]"#,
    r#"meta[name="sailthru.image.thumb"]"#,
    r#"meta[name="sailthru.date"]"#,
    r#"meta[name="sailthru.author"]"#,
    r#"meta[name="sailthru.tags"]"#,
    r#"meta[name="sailthru.link"]"#,
    r#"meta[name="sailthru.allow_url"]"#,
    r#"meta[name="sailthru.hide_image"]"#,
    r#"meta[name="sailthru.hide_tags"]"#,
    r#"meta[name="sailthru.hide_author"]"#,
    r#"meta[name="sailthru.hide_date"]"#,
    r#"meta[name="sailthru.hide_title"]"#,
    r#"meta[name="sailthru.hide_description"]"#,
    r#"meta[name="sailthru.hide_url"]"#,
    r#"meta[name="sailthru.hide"]"#,
    r#"meta[name="sailthru"]"#,
];

pub static CONTENT: LazyLock<Vec<Candidate>> = LazyLock::new(|| compile(CONTENT_SELECTORS));
pub static TITLE: LazyLock<Vec<Candidate>> = LazyLock::new(|| compile(TITLE_SELECTORS));
pub static DESCRIPTION: LazyLock<Vec<Candidate>> =
    LazyLock::new(|| compile(DESCRIPTION_SELECTORS));

fn compile(sources: &[&'static str]) -> Vec<Candidate> {
    sources
        .iter()
        .map(|source| Candidate {
            source,
            selector: Selector::parse(source).unwrap(),
            extract: if source.starts_with("meta[") {
                Extract::Attr("content")
            } else {
                Extract::Text
            },
        })
        .collect()
}
