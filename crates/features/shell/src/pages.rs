use crate::Shell;
use crate::error::{ShellError, ShellErrorExt};
use crate::metadata::PageMetadata;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use dayqhi_kernel::prelude::ApiState;
use maud::{Markup, html};

const STYLESHEET: &str = include_str!("../assets/globals.css");

fn shell(state: &ApiState) -> Result<&Shell, ShellError> {
    state.try_get_slice::<Shell>().context("Shell slice is not registered")
}

fn landing(shell: &Shell) -> Markup {
    let metadata = shell.layout.metadata();
    html! {
        main {
            h1 { (metadata.title) }
            p { (metadata.description) }
            p {
                "Register at " code { "POST /api/users" } ", then add alerts for your location. "
                a href="/api" { "Browse the API" }
            }
        }
    }
}

pub(crate) async fn index(State(state): State<ApiState>) -> Result<Markup, ShellError> {
    let shell = shell(&state)?;
    Ok(shell.layout.render(landing(shell)))
}

pub(crate) async fn stylesheet(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ShellError> {
    let shell = shell(&state)?;
    let css = format!("{}\n{STYLESHEET}", shell.layout.font().css());

    Ok((
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        css,
    ))
}

/// Fallback for unknown paths, rendered through the root layout.
pub async fn not_found(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ShellError> {
    let shell = shell(&state)?;
    let page = html! {
        main {
            h1 { "404" }
            p { "This page could not be found." }
            a href="/" { "Back to " (shell.layout.metadata().title) }
        }
    };

    Ok((StatusCode::NOT_FOUND, shell.layout.render_page(&PageMetadata::titled("Not Found"), page)))
}
