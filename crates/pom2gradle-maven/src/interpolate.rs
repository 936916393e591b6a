//! `${...}` property interpolation.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Passes over a value before remaining placeholders are reported.
pub const MAX_DEPTH: usize = 10;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Outcome of interpolating one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolated {
    pub value: String,
    /// Placeholder names left in `value`, in order of first appearance.
    pub unresolved: Vec<String>,
}

impl Interpolated {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Whether `value` still contains a `${...}` placeholder.
pub fn has_placeholder(value: &str) -> bool {
    placeholder().is_match(value)
}

/// Resolves placeholders against a merged property map plus Maven's
/// built-in project properties.
#[derive(Debug, Clone, Default)]
pub struct PropertyResolver {
    properties: BTreeMap<String, String>,
    builtins: BTreeMap<String, String>,
}

impl PropertyResolver {
    pub const fn new(properties: BTreeMap<String, String>) -> Self {
        Self {
            properties,
            builtins: BTreeMap::new(),
        }
    }

    /// Registers a built-in such as `project.version`. `None` is ignored.
    pub fn set_builtin(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.builtins.insert(key.to_string(), value.to_string());
        }
    }

    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Raw value for a placeholder name.
    ///
    /// Declared properties win over built-ins; `project.x` additionally
    /// falls back to a declared `x`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .or_else(|| self.builtins.get(name))
            .or_else(|| {
                name.strip_prefix("project.")
                    .and_then(|short| self.properties.get(short))
            })
            .map(String::as_str)
    }

    /// Replaces every placeholder, following chains up to [`MAX_DEPTH`]
    /// passes. Unknown or cyclic references stay literal.
    pub fn interpolate(&self, raw: &str) -> Interpolated {
        let mut value = raw.to_string();
        for _ in 0..MAX_DEPTH {
            if !has_placeholder(&value) {
                break;
            }
            let next = placeholder()
                .replace_all(&value, |caps: &regex::Captures<'_>| {
                    self.lookup(&caps[1])
                        .map_or_else(|| caps[0].to_string(), str::to_string)
                })
                .into_owned();
            if next == value {
                break;
            }
            value = next;
        }

        let mut unresolved: Vec<String> = Vec::new();
        for caps in placeholder().captures_iter(&value) {
            let name = caps[1].to_string();
            if !unresolved.contains(&name) {
                unresolved.push(name);
            }
        }
        Interpolated { value, unresolved }
    }

    /// Interpolates a value that must resolve completely.
    ///
    /// # Errors
    ///
    /// Returns the first placeholder name left unresolved.
    pub fn require(&self, raw: &str) -> std::result::Result<String, String> {
        let Interpolated { value, unresolved } = self.interpolate(raw);
        match unresolved.into_iter().next() {
            Some(name) => Err(name),
            None => Ok(value),
        }
    }
}
