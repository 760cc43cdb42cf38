use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;

// =============================================================================
// Front matter
// =============================================================================

/// Front matter of a markdown post.
///
/// ```markdown
/// ---
/// title: Hello
/// date: 05.03.2024
/// tags: [rust, web]
/// ---
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFrontMatter {
    pub title: Option<String>,
    /// `DD.MM.YYYY`; kept as a YAML value so unquoted dates and numbers load
    pub date: Option<serde_yaml::Value>,
    #[serde(default)]
    pub tags: Option<TagList>,
}

/// Tags may be written as a single string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    One(String),
    Many(Vec<String>),
}

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagList::One(tag) => vec![tag],
            TagList::Many(tags) => tags,
        }
    }
}

/// Front matter of a hand-written HTML page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFrontMatter {
    /// Page title (overrides the filename-derived title)
    pub title: Option<String>,
    /// Breadcrumb markup for the layout's `{{page}}` placeholder
    pub page: Option<String>,
    /// Everything else, exposed to a page-specific template as placeholders
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Result of splitting a file into front matter and body.
#[derive(Debug)]
pub struct ParsedContent<T> {
    /// The parsed front matter (default if none found)
    pub front_matter: T,
    /// The content without the front matter block
    pub body: String,
}

/// Split a YAML front matter block off the top of `content`.
///
/// The block must open on the first line with `---` and close with a line
/// that is exactly `---`. Without a closing line, the whole input is body.
pub fn parse_front_matter<T>(content: &str) -> Result<ParsedContent<T>, serde_yaml::Error>
where
    T: DeserializeOwned + Default,
{
    let Some((yaml, body)) = split_front_matter(content) else {
        return Ok(ParsedContent {
            front_matter: T::default(),
            body: content.to_string(),
        });
    };

    let front_matter = if yaml.trim().is_empty() {
        T::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok(ParsedContent {
        front_matter,
        body: body.to_string(),
    })
}

fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != "---" {
        return None;
    }

    let yaml_start = first_line_end + 1;
    let mut line_start = yaml_start;
    while line_start <= content.len() {
        let line_end = content[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(content.len());
        if content[line_start..line_end].trim_end() == "---" {
            let body_start = (line_end + 1).min(content.len());
            return Some((&content[yaml_start..line_start], &content[body_start..]));
        }
        if line_end == content.len() {
            break;
        }
        line_start = line_end + 1;
    }
    None
}

/// Render a scalar YAML value as placeholder text. Sequences and maps have
/// no sensible text form and yield `None`.
pub fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_front_matter() {
        let content = "---\ntitle: My Post\ndate: 05.03.2024\ntags:\n  - rust\n  - web\n---\n\n# Hello\n";
        let parsed = parse_front_matter::<PostFrontMatter>(content).unwrap();
        let fm = parsed.front_matter;
        assert_eq!(fm.title.as_deref(), Some("My Post"));
        assert_eq!(
            fm.date.as_ref().and_then(yaml_scalar_to_string).as_deref(),
            Some("05.03.2024")
        );
        assert_eq!(fm.tags.unwrap().into_vec(), vec!["rust", "web"]);
        assert_eq!(parsed.body, "\n# Hello\n");
    }

    #[test]
    fn test_single_tag_string() {
        let content = "---\ntitle: T\ntags: solo\n---\nbody";
        let parsed = parse_front_matter::<PostFrontMatter>(content).unwrap();
        assert_eq!(parsed.front_matter.tags.unwrap().into_vec(), vec!["solo"]);
    }

    #[test]
    fn test_page_front_matter_extra_fields() {
        let content = "---\ntitle: About\npage: <em>About</em>\nauthor: Ana\nyear: 2024\n---\n<div id=\"main\"></div>";
        let parsed = parse_front_matter::<PageFrontMatter>(content).unwrap();
        let fm = parsed.front_matter;
        assert_eq!(fm.title.as_deref(), Some("About"));
        assert_eq!(fm.page.as_deref(), Some("<em>About</em>"));
        assert_eq!(
            fm.extra.get("year").and_then(yaml_scalar_to_string).as_deref(),
            Some("2024")
        );
        assert_eq!(parsed.body, "<div id=\"main\"></div>");
    }

    #[test]
    fn test_no_front_matter() {
        let content = "<p>plain</p>\n---\nnot front matter\n---\n";
        let parsed = parse_front_matter::<PageFrontMatter>(content).unwrap();
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let content = "---\ntitle: Oops\n";
        let parsed = parse_front_matter::<PostFrontMatter>(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.body, content);
    }

    #[test]
    fn test_empty_front_matter() {
        let parsed = parse_front_matter::<PostFrontMatter>("---\n---\n# Content").unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.body, "# Content");
    }

    #[test]
    fn test_crlf_delimiters() {
        let parsed =
            parse_front_matter::<PostFrontMatter>("---\r\ntitle: Win\r\n---\r\nbody").unwrap();
        assert_eq!(parsed.front_matter.title.as_deref(), Some("Win"));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let result = parse_front_matter::<PostFrontMatter>("---\ntitle: [unclosed\n---\n");
        assert!(result.is_err());
    }
}
