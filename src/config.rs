//! Job configuration loaded from `config.yml`.
//!
//! The file is a YAML mapping from job name to job definition. Every job names
//! a start URL and a tree of extraction rules; rules are typed by their `type`
//! key and validated once, before any page is fetched.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::ConfigError;
use crate::scrapers::document;

/// Default configuration filename, looked up in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.yml";

/// Name -> value mapping that keeps declaration order.
///
/// YAML mappings are unordered as far as serde is concerned, so rules and jobs
/// are collected through a map visitor into a vector instead.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMap<T>(Vec<(String, T)>);

impl<T> NamedMap<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for NamedMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Serialize> Serialize for NamedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct NamedMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for NamedMapVisitor<T> {
    type Value = NamedMap<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(name) = access.next_key::<String>()? {
            if entries.iter().any(|(n, _)| *n == name) {
                return Err(de::Error::custom(format!("duplicate key `{}`", name)));
            }
            let value = access.next_value()?;
            entries.push((name, value));
        }
        Ok(NamedMap(entries))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NamedMapVisitor(PhantomData))
    }
}

/// Extraction rules in declaration order, keyed by output field name.
pub type Rules = NamedMap<Rule>;

/// A single extraction rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule {
    /// Text content of the first matching node.
    Text {
        xpath: String,
        #[serde(default, skip_serializing_if = "is_false")]
        trim: bool,
    },
    /// An attribute of the first matching node.
    Attribute {
        xpath: String,
        attribute: String,
        #[serde(default, rename = "resolveUrl", skip_serializing_if = "is_false")]
        resolve_url: bool,
    },
    /// One nested record per matching node.
    Elements { xpath: String, elements: Rules },
}

impl Rule {
    pub fn xpath(&self) -> &str {
        match self {
            Rule::Text { xpath, .. } | Rule::Attribute { xpath, .. } | Rule::Elements { xpath, .. } => {
                xpath
            }
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Which page relative URLs are resolved against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAgainst {
    /// The page the value was extracted from.
    #[default]
    Page,
    /// The job's start URL, regardless of how far pagination has advanced.
    Start,
}

impl ResolveAgainst {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// One scrape job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Absolute URL of the first page.
    pub url: String,
    /// Minimum time between the end of one fetch and the start of the next.
    /// Absent or non-positive means unthrottled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_every_millis: Option<i64>,
    /// Stop after this many pages even if a next page exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "ResolveAgainst::is_default")]
    pub resolve_against: ResolveAgainst,
    pub elements: Rules,
}

impl SourceConfig {
    /// Parse the start URL.
    pub fn start_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }

    /// Interval between fetches, if the job is throttled.
    pub fn request_interval(&self) -> Option<Duration> {
        self.request_every_millis
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms as u64))
    }

    /// Pick the base URL for relative references found on `page`.
    pub fn resolution_base<'a>(&self, start: &'a Url, page: &'a Url) -> &'a Url {
        match self.resolve_against {
            ResolveAgainst::Page => page,
            ResolveAgainst::Start => start,
        }
    }

    fn validate(&self, job: &str) -> Result<(), ConfigError> {
        if let Err(source) = self.start_url() {
            return Err(ConfigError::InvalidUrl {
                job: job.to_string(),
                url: self.url.clone(),
                source,
            });
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::InvalidJob {
                job: job.to_string(),
                reason: "maxPages must be greater than zero".to_string(),
            });
        }
        validate_rules(&self.elements, job)
    }
}

fn validate_rules(rules: &Rules, parent: &str) -> Result<(), ConfigError> {
    for (name, rule) in rules.iter() {
        let path = format!("{}/{}", parent, name);
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidRule {
                path,
                reason: "rule name must not be empty".to_string(),
            });
        }
        if let Err(reason) = document::compile(rule.xpath()) {
            return Err(ConfigError::InvalidQuery {
                path,
                query: rule.xpath().to_string(),
                reason,
            });
        }
        match rule {
            Rule::Attribute { attribute, .. } if attribute.trim().is_empty() => {
                return Err(ConfigError::InvalidRule {
                    path,
                    reason: "attribute name must not be empty".to_string(),
                });
            }
            Rule::Elements { elements, .. } => validate_rules(elements, &path)?,
            _ => {}
        }
    }
    Ok(())
}

/// All jobs from a configuration file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    jobs: NamedMap<SourceConfig>,
}

impl Config {
    /// Read, parse and validate a configuration file.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (name, job) in self.jobs.iter() {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidJob {
                    job: name.to_string(),
                    reason: "job name must not be empty".to_string(),
                });
            }
            job.validate(name)?;
        }
        Ok(())
    }

    pub fn jobs(&self) -> impl Iterator<Item = (&str, &SourceConfig)> {
        self.jobs.iter()
    }

    pub fn job(&self, name: &str) -> Option<&SourceConfig> {
        self.jobs.get(name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
