//! Built-in schema for IEEE Xplore document pages

use crate::browser::Selector;
use crate::extract::{ExtractionNode, PreHook, Schema, Transform};

const AUTHORS_HEADER: &str = "#authors-header";
const AUTHORS_ENTRIES: &str = r#"//*[@id="authors"]//*[@class="authors-accordion-container"]"#;
const AUTHOR_ITEM: &str = "xpl-author-item:nth-child(1) > div:nth-child(1) > div:nth-child(1) > div";
const KEYWORDS_HEADER: &str = "#keywords-header";
const KEYWORDS_PANEL: &str = r#"//*[@id="keywords"]//ul"#;

fn css(expression: &str) -> ExtractionNode {
    ExtractionNode::select(Selector::css(expression))
}

fn metric(nth: u32) -> ExtractionNode {
    css(&format!(
        "button.document-banner-metric:nth-child({}) > div:nth-child(1)",
        nth
    ))
    .transform(Transform::ParseInt)
}

fn keyword_section(heading: &str) -> Selector {
    Selector::xpath(format!(
        r#"//*[@id="keywords"]//li[.//strong[text()="{}"]]//ul"#,
        heading
    ))
}

/// A flattened keyword list under one heading of the keywords panel
///
/// Every heading shares the panel, so the expand hook checks the panel itself
/// rather than its own section.
fn keywords(heading: &str) -> ExtractionNode {
    ExtractionNode::select(keyword_section(heading))
        .hook(PreHook::Expand {
            trigger: Selector::css(KEYWORDS_HEADER),
            revealed: Selector::xpath(KEYWORDS_PANEL),
        })
        .field(
            "tags",
            ExtractionNode::select(Selector::tag("li"))
                .list()
                .transform(Transform::Strip {
                    chars: Some(",\n".to_string()),
                }),
        )
        .transform(Transform::Pluck {
            field: "tags".to_string(),
        })
        .transform(Transform::FlattenSplit {
            separator: ", ".to_string(),
        })
}

/// Returns the schema used when no schema file is configured
pub fn document_schema() -> Schema {
    let authors = Selector::xpath(AUTHORS_ENTRIES);

    Schema::new()
        .field("Title", css(".document-title > span:nth-child(1)"))
        .field(
            "Page(s)",
            css("div.col-6:nth-child(1) > div:nth-child(1)")
                .transform(Transform::RegexCapture {
                    pattern: r"Page\(s\): (.*)".to_string(),
                    group: 1,
                })
                .transform(Transform::Split {
                    separator: Some("-".to_string()),
                })
                .transform(Transform::RangeLength),
        )
        .field("Cites in Papers", metric(1))
        .field("Cites in Patent", metric(2))
        .field("Full Text Views", metric(3))
        .field(
            "Publisher",
            css(".publisher-title-tooltip > xpl-publisher:nth-child(1) > span:nth-child(1) > span:nth-child(1) > span:nth-child(1) > span:nth-child(2)"),
        )
        .field("DOI", css(".stats-document-abstract-doi > a:nth-child(2)"))
        .field(
            "Date of Publication",
            css(".doc-abstract-pubdate").transform(Transform::RegexCapture {
                pattern: "Date of Publication: (.*)".to_string(),
                group: 1,
            }),
        )
        .field("Abstract", css("div.u-mb-1:nth-child(1) > div:nth-child(2)"))
        .field(
            "Published in",
            css("a.stats-document-abstract-publishedIn, .stats-document-abstract-publishedIn > a:nth-child(2)")
                .field("name", ExtractionNode::context())
                .field(
                    "link",
                    ExtractionNode::context().transform(Transform::Attribute {
                        name: "href".to_string(),
                    }),
                ),
        )
        .field(
            "Authors",
            ExtractionNode::select(authors.clone())
                .list()
                .hook(PreHook::Expand {
                    trigger: Selector::css(AUTHORS_HEADER),
                    revealed: authors,
                })
                .field("name", css(&format!("{} > div:nth-child(1)", AUTHOR_ITEM)))
                .field("from", css(&format!("{} > div:nth-child(2)", AUTHOR_ITEM))),
        )
        .field("IEEE Keywords", keywords("IEEE Keywords"))
        .field("Author Keywords", keywords("Author Keywords"))
}
