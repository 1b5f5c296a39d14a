use crate::compile;
use crate::config::{
    FacetConfig, GroupConfig, HighlightConfig, MoreLikeThisConfig, ResultConfig,
};
use crate::errors::Result;
use crate::params::ParameterMap;
use crate::parser::QueryParser;
use serde::{Deserialize, Serialize};

/// Shared result-shaping inputs independent of the parser dialect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonParams {
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub start: Option<u32>,
    /// Returned-field list, insertion order, names unique.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub sort: Option<String>,
    /// Filter expressions in call order; duplicates are the engine's
    /// business, not ours to dedupe.
    #[serde(default)]
    pub filters: Vec<String>,
}

/// An immutable description of one search request. `with_*` calls
/// consume the value and return a new one; `compile` turns it into the
/// flat wire parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub parser: QueryParser,
    #[serde(default)]
    pub common: CommonParams,
    #[serde(default)]
    pub configs: Vec<ResultConfig>,
}

impl QuerySpec {
    pub fn new(parser: impl Into<QueryParser>) -> Self {
        Self {
            parser: parser.into(),
            common: CommonParams::default(),
            configs: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.common.rows = Some(rows);
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.common.start = Some(start);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            if !self.common.fields.contains(&field) {
                self.common.fields.push(field);
            }
        }
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.common.sort = Some(sort.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.common.filters.push(filter.into());
        self
    }

    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common.filters.extend(filters.into_iter().map(Into::into));
        self
    }

    pub fn with_config(mut self, config: ResultConfig) -> Self {
        self.configs.push(config);
        self
    }

    pub fn with_facet(self, facet: FacetConfig) -> Self {
        self.with_config(ResultConfig::Facet(facet))
    }

    pub fn with_group(self, group: GroupConfig) -> Self {
        self.with_config(ResultConfig::Group(group))
    }

    pub fn with_highlight(self, highlight: HighlightConfig) -> Self {
        self.with_config(ResultConfig::Highlight(highlight))
    }

    pub fn with_more_like_this(self, mlt: MoreLikeThisConfig) -> Self {
        self.with_config(ResultConfig::MoreLikeThis(mlt))
    }

    /// Compile to wire parameters with default options.
    pub fn compile(&self) -> Result<ParameterMap> {
        compile::compile(self)
    }
}
