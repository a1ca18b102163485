//! Path normalization and pattern compilation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, RouterError};
use crate::params::{AliasMap, PathParams};

/// Fragment used for placeholders without a constraint: one or more
/// non-slash characters.
pub const DEFAULT_FRAGMENT: &str = "[^/]+";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([0-9a-zA-Z_]+)(\?)?\}").expect("placeholder regex is valid")
});

/// Normalizes a request path or template.
///
/// Trailing slashes are removed unless the path is the root, and the result
/// always starts with exactly one slash.
///
/// # Example
///
/// ```
/// use oxide_routing::normalize_path;
///
/// assert_eq!(normalize_path("//users/42/"), "/users/42");
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("///"), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Joins a group prefix and a route template into the effective template.
///
/// # Example
///
/// ```
/// use oxide_routing::join_template;
///
/// assert_eq!(join_template(Some("admin/"), "/posts"), "/admin/posts");
/// assert_eq!(join_template(Some("/admin"), "/"), "/admin");
/// assert_eq!(join_template(None, "posts/{id}"), "/posts/{id}");
/// ```
pub fn join_template(prefix: Option<&str>, template: &str) -> String {
    let template = normalize_path(template);
    match prefix.map(normalize_path) {
        Some(prefix) if prefix != "/" => {
            if template == "/" {
                prefix
            } else {
                prefix + &template
            }
        }
        _ => template,
    }
}

/// A compiled path pattern for matching normalized paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The template the pattern was compiled from.
    pattern: String,
    /// Compiled, anchored regex.
    regex: Regex,
    /// Parameter names in template order.
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a route template.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Required parameter
    /// - `/users/{id?}` - Optional parameter; must be a whole path segment
    ///
    /// Each placeholder is restricted by the fragment `constraints` holds for
    /// its name, or by [`DEFAULT_FRAGMENT`].
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedTemplate`] for invalid placeholder
    /// syntax, an optional placeholder sharing its segment with other text,
    /// or a placeholder name used twice, and
    /// [`RouterError::InvalidConstraint`] when a constraint fragment is not a
    /// valid regular expression.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_routing::{AliasMap, PathPattern};
    ///
    /// let constraints = AliasMap::new().with("id", "[0-9]+");
    /// let pattern = PathPattern::compile("/posts/{id}/{slug?}", &constraints).unwrap();
    /// let params = pattern.match_path("/posts/42", &AliasMap::new()).unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert_eq!(params.get("slug"), None);
    /// assert!(pattern.match_path("/posts/abc", &AliasMap::new()).is_none());
    /// ```
    pub fn compile(template: &str, constraints: &AliasMap) -> Result<Self> {
        let malformed = |reason: String| RouterError::MalformedTemplate {
            template: template.to_string(),
            reason,
        };

        let mut body = String::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut has_fixed_part = false;
        let mut has_optional_part = false;
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let optional = caps.get(2).is_some();

            if param_names.iter().any(|n| n == name) {
                return Err(malformed(format!("placeholder '{name}' is used twice")));
            }

            let mut literal = &template[last..whole.start()];
            if optional {
                let rest = &template[whole.end()..];
                literal = literal
                    .strip_suffix('/')
                    .filter(|_| rest.is_empty() || rest.starts_with('/'))
                    .ok_or_else(|| {
                        malformed(format!(
                            "optional placeholder '{{{name}?}}' must be a whole path segment"
                        ))
                    })?;
            }
            has_fixed_part |= push_literal(&mut body, literal).map_err(malformed)?;

            let group = group_name(param_names.len());
            let fragment = constraints.get(name).unwrap_or(DEFAULT_FRAGMENT);
            check_fragment(template, fragment)?;
            if optional {
                has_optional_part = true;
                body.push_str(&format!("(?:/(?P<{group}>{fragment}))?"));
            } else {
                has_fixed_part = true;
                body.push_str(&format!("(?P<{group}>{fragment})"));
            }

            param_names.push(name.to_string());
            last = whole.end();
        }
        has_fixed_part |= push_literal(&mut body, &template[last..]).map_err(malformed)?;

        // A template made only of optional segments also matches the root.
        let regex_str = if has_optional_part && !has_fixed_part {
            format!("^(?:/|{body})$")
        } else {
            format!("^(?:{body})$")
        };

        let regex = Regex::new(&regex_str).map_err(|source| RouterError::InvalidConstraint {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: template.to_string(),
            regex,
            param_names,
        })
    }

    /// Attempts to match a normalized path against this pattern.
    ///
    /// Every declared parameter is present in the result, in template order.
    /// Its value is the captured text when the capture is non-empty, the
    /// entry from `defaults` otherwise, or absent when neither exists.
    pub fn match_path(&self, path: &str, defaults: &AliasMap) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();
        for (i, name) in self.param_names.iter().enumerate() {
            let value = caps
                .name(&group_name(i))
                .map(|m| m.as_str())
                .filter(|v| !v.is_empty())
                .or_else(|| defaults.get(name));
            params.insert(name.clone(), value.map(str::to_string));
        }

        Some(params)
    }

    /// Returns the template string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the compiled regular expression.
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

/// Capture group name for the placeholder at `index`.
///
/// Placeholder names may start with a digit, which the regex engine does not
/// accept as a group name, so groups are named by position.
fn group_name(index: usize) -> String {
    format!("p{index}")
}

/// Rejects a fragment that is not a regular expression on its own, such as
/// `a)|(b`, which would otherwise escape its capture group.
fn check_fragment(template: &str, fragment: &str) -> Result<()> {
    Regex::new(fragment)
        .map(drop)
        .map_err(|source| RouterError::InvalidConstraint {
            template: template.to_string(),
            source,
        })
}

/// Appends escaped literal text; returns whether it was non-empty.
fn push_literal(body: &mut String, literal: &str) -> std::result::Result<bool, String> {
    if literal.contains(['{', '}']) {
        return Err(format!("invalid placeholder near '{literal}'"));
    }
    body.push_str(&regex::escape(literal));
    Ok(!literal.is_empty())
}
