//! HTML rendering of view models.

use browse::{Entry, FilePayload, ViewBody, ViewModel};
use maud::{html, Markup, DOCTYPE};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }\
ul.entries { list-style: none; padding: 0; }\
ul.entries li { padding: 2px 0; }\
li.dir a { font-weight: bold; }\
pre { background: #f6f6f6; padding: 1em; overflow-x: auto; }\
p.notice { color: #8a6d3b; }";

/// Link to the browse endpoint for a relative path.
pub fn browse_href(relative: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(relative.as_bytes()).collect();
    format!("/?path={}", encoded)
}

/// Path as shown to the user, rooted at `/`.
fn display_path(relative: &str) -> String {
    if relative == browse::ROOT_MARKER {
        "/".to_string()
    } else {
        format!("/{}", relative)
    }
}

/// Render a full page for a view model.
pub fn render_page(view: &ViewModel) -> Markup {
    let heading = display_path(&view.current_path);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Videobrowser - " (heading) }
                style { (STYLE) }
            }
            body {
                h1 { (heading) }
                @if !view.is_root() {
                    p.parent {
                        a href=(browse_href(&view.parent_path)) { "Up to " (display_path(&view.parent_path)) }
                    }
                }
                @match &view.body {
                    ViewBody::Directory { entries } => { (render_entries(entries)) }
                    ViewBody::File { name, payload } => { (render_file(name, payload)) }
                }
            }
        }
    }
}

fn render_entries(entries: &[Entry]) -> Markup {
    html! {
        @if entries.is_empty() {
            p.empty { "This directory is empty." }
        } @else {
            ul.entries {
                @for entry in entries {
                    @if entry.is_dir() {
                        li.dir { a href=(browse_href(&entry.path)) { (entry.name) "/" } }
                    } @else {
                        li.file { a href=(browse_href(&entry.path)) { (entry.name) } }
                    }
                }
            }
        }
    }
}

fn render_file(name: &str, payload: &FilePayload) -> Markup {
    html! {
        h2 { (name) }
        @match payload {
            FilePayload::Text { content, lossy } => {
                @if *lossy {
                    p.notice { "This file is not valid UTF-8; undecodable bytes are shown as \u{fffd}." }
                }
                pre { (content) }
            }
            FilePayload::TooLarge { size, limit } => {
                p.notice {
                    "Too large to preview: " (format_size(*size))
                    " exceeds the " (format_size(*limit)) " limit."
                }
            }
        }
    }
}

/// Format a byte count with a binary unit.
fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
