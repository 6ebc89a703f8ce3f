//! Shell feature slice: the root HTML document every page is rendered into, its metadata,
//! the body font token and the global stylesheet.

mod error;
pub mod font;
pub mod layout;
pub mod metadata;
mod pages;

pub use crate::error::{ShellError, ShellErrorExt};
pub use crate::font::Font;
pub use crate::layout::RootLayout;
pub use crate::metadata::{Metadata, PageMetadata};

use axum::Router;
use axum::routing::get;
use dayqhi_kernel::prelude::{ApiConfig, ApiState, InitializedSlice};
use layout::GLOBAL_STYLESHEET_PATH;

#[dayqhi_derive::dayqhi_slice]
pub struct Shell {
    pub layout: RootLayout,
}

/// Builds the root layout from the `site` config section.
///
/// # Errors
/// Fails when the font family, title or description is blank.
pub fn init(config: &ApiConfig) -> Result<InitializedSlice, ShellError> {
    let site = &config.site;
    let font = Font::google(&site.font.family, site.font.subsets.iter().cloned())
        .context("site.font.family")?;

    tracing::info!(font = font.family(), class = font.class_name(), "Shell slice initialized");

    let layout = RootLayout::new(font, Metadata::try_from(site)?);
    Ok(InitializedSlice::new(Shell::new(ShellInner { layout })))
}

/// HTML routes: landing page and global stylesheet.
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(pages::index))
        .route(GLOBAL_STYLESHEET_PATH, get(pages::stylesheet))
}

pub use pages::not_found;
