//! Markdown rendering with heading ids, driven by the site's options file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("failed to read markdown options {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid markdown options {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Renderer options, read from a JSON file such as:
///
/// ```json
/// { "gfm": true, "breaks": false, "headerIds": true, "headerPrefix": "h-" }
/// ```
///
/// Unknown keys are ignored so an options file shared with other tooling
/// still loads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    /// Tables, strikethrough, task lists, footnotes and GFM blockquote tags
    pub gfm: bool,
    /// Render single newlines inside a paragraph as `<br>`
    pub breaks: bool,
    /// Curly quotes and typographic dashes
    pub smartypants: bool,
    /// Give headings a slugified `id`
    pub header_ids: bool,
    pub header_prefix: String,
    /// Pass raw HTML through; when off it is escaped as text
    pub html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            smartypants: false,
            header_ids: true,
            header_prefix: String::new(),
            html: true,
        }
    }
}

impl MarkdownOptions {
    /// Load options from `path`. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, MarkdownError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no markdown options file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| MarkdownError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| MarkdownError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.gfm {
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            options.insert(Options::ENABLE_FOOTNOTES);
            options.insert(Options::ENABLE_GFM);
        }
        if self.smartypants {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }
}

/// Render markdown to an HTML fragment.
pub fn render_markdown(markdown: &str, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(markdown, options.parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !options.html => Event::Text(raw),
        Event::SoftBreak if options.breaks => Event::HardBreak,
        other => other,
    });

    // Headings are buffered so their text can be slugified into an id
    struct HeadingState<'a> {
        level: HeadingLevel,
        classes: Vec<String>,
        attrs: Vec<(String, Option<String>)>,
        text: String,
        inner: Vec<Event<'a>>,
    }
    let mut in_heading: Option<HeadingState> = None;
    let mut used_ids: HashSet<String> = HashSet::new();

    let events: Vec<Event> = parser
        .flat_map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                ref id,
                ref classes,
                ref attrs,
            }) if options.header_ids => {
                if let Some(existing) = id {
                    used_ids.insert(existing.to_string());
                    return vec![event];
                }
                in_heading = Some(HeadingState {
                    level,
                    classes: classes.iter().map(|c| c.to_string()).collect(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                        .collect(),
                    text: String::new(),
                    inner: Vec::new(),
                });
                vec![]
            }
            Event::End(TagEnd::Heading(_)) if in_heading.is_some() => {
                let Some(state) = in_heading.take() else {
                    return vec![event];
                };

                let base_id = format!("{}{}", options.header_prefix, slugify(&state.text));
                let mut id = base_id.clone();
                let mut suffix = 1;
                while used_ids.contains(&id) {
                    id = format!("{}-{}", base_id, suffix);
                    suffix += 1;
                }
                used_ids.insert(id.clone());

                let class_attr = if state.classes.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"{}\"", state.classes.join(" "))
                };
                let extra_attrs = state
                    .attrs
                    .iter()
                    .map(|(k, v)| match v {
                        Some(val) => format!(" {}=\"{}\"", k, val),
                        None => format!(" {}", k),
                    })
                    .collect::<String>();

                let mut inner_html = String::new();
                html::push_html(&mut inner_html, state.inner.into_iter());

                let level = state.level as usize;
                vec![Event::Html(CowStr::from(format!(
                    "<h{level} id=\"{id}\"{class_attr}{extra_attrs}>{inner_html}</h{level}>\n"
                )))]
            }
            other => match in_heading.as_mut() {
                Some(state) => {
                    if let Event::Text(text) | Event::Code(text) = &other {
                        state.text.push_str(text);
                    }
                    state.inner.push(other);
                    vec![]
                }
                None => vec![other],
            },
        })
        .collect();

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Convert heading text to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "")
}
