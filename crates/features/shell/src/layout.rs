use crate::font::Font;
use crate::metadata::{Metadata, PageMetadata};
use maud::{DOCTYPE, Markup, Render, html};

pub const GLOBAL_STYLESHEET_PATH: &str = "/globals.css";
/// Document language. Every page is English.
pub const LANG: &str = "en";

/// Outermost document structure shared by every page.
#[derive(Debug, Clone)]
pub struct RootLayout {
    font: Font,
    metadata: Metadata,
}

impl RootLayout {
    #[must_use]
    pub const fn new(font: Font, metadata: Metadata) -> Self {
        Self { font, metadata }
    }

    #[must_use]
    pub const fn font(&self) -> &Font {
        &self.font
    }

    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Renders `children` as the only content of `<body>`, with root metadata.
    pub fn render(&self, children: impl Render) -> Markup {
        self.render_page(&PageMetadata::default(), children)
    }

    /// Like [`RootLayout::render`], with page-level metadata merged over the root record.
    pub fn render_page(&self, page: &PageMetadata, children: impl Render) -> Markup {
        let metadata = self.metadata.merge(page);

        html! {
            (DOCTYPE)
            html lang=(LANG) {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (metadata.title) }
                    meta name="description" content=(metadata.description);
                    link rel="preconnect" href="https://fonts.gstatic.com" crossorigin;
                    link rel="stylesheet" href=(self.font.stylesheet_url());
                    link rel="stylesheet" href=(GLOBAL_STYLESHEET_PATH);
                }
                body class=(self.font.class_name()) { (children) }
            }
        }
    }
}
