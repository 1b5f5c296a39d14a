use serde::{Deserialize, Serialize};

/// One query-language dialect and its dialect-specific inputs. Each
/// variant compiles to its own primary query parameter shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryParser {
    Standard(StandardQuery),
    DisMax(DisMaxQuery),
    ExtendedDisMax(ExtendedDisMaxQuery),
    Knn(KnnQuery),
    KnnTextToVector(KnnTextToVectorQuery),
    VectorSimilarity(VectorSimilarityQuery),
    GeoFilter(GeoFilterQuery),
    Bbox(BboxQuery),
    Terms(TermsQuery),
}

macro_rules! parser_from {
    ($ty:ident => $variant:ident) => {
        impl From<$ty> for QueryParser {
            fn from(q: $ty) -> Self {
                QueryParser::$variant(q)
            }
        }
    };
}

parser_from!(StandardQuery => Standard);
parser_from!(DisMaxQuery => DisMax);
parser_from!(ExtendedDisMaxQuery => ExtendedDisMax);
parser_from!(KnnQuery => Knn);
parser_from!(KnnTextToVectorQuery => KnnTextToVector);
parser_from!(VectorSimilarityQuery => VectorSimilarity);
parser_from!(GeoFilterQuery => GeoFilter);
parser_from!(BboxQuery => Bbox);
parser_from!(TermsQuery => Terms);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryOperator {
    And,
    Or,
}

impl QueryOperator {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            QueryOperator::And => "AND",
            QueryOperator::Or => "OR",
        }
    }
}

/// Insertion-ordered `field -> boost` pairs, names unique. Setting a
/// field again replaces its boost without moving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoostMap(Vec<(String, f64)>);

impl BoostMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, boost: f64) -> Self {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = boost,
            None => self.0.push((name, boost)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, f64)] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for BoostMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BoostMap::new(), |m, (name, boost)| m.field(name, boost))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardQuery {
    pub query: String,
    #[serde(default)]
    pub operator: Option<QueryOperator>,
    #[serde(default)]
    pub default_field: Option<String>,
    #[serde(default)]
    pub split_on_whitespace: Option<bool>,
}

impl StandardQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operator: None,
            default_field: None,
            split_on_whitespace: None,
        }
    }

    pub fn operator(mut self, op: QueryOperator) -> Self {
        self.operator = Some(op);
        self
    }

    pub fn default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn split_on_whitespace(mut self, sow: bool) -> Self {
        self.split_on_whitespace = Some(sow);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisMaxQuery {
    pub query: String,
    pub query_fields: BoostMap,
    #[serde(default)]
    pub phrase_fields: BoostMap,
    #[serde(default)]
    pub phrase_slop: Option<u32>,
    #[serde(default)]
    pub min_match: Option<String>,
    #[serde(default)]
    pub tie_breaker: Option<f64>,
    #[serde(default)]
    pub boost_queries: Vec<String>,
    #[serde(default)]
    pub boost_functions: Vec<String>,
}

impl DisMaxQuery {
    pub fn new(query: impl Into<String>, query_fields: BoostMap) -> Self {
        Self {
            query: query.into(),
            query_fields,
            phrase_fields: BoostMap::new(),
            phrase_slop: None,
            min_match: None,
            tie_breaker: None,
            boost_queries: Vec::new(),
            boost_functions: Vec::new(),
        }
    }

    pub fn phrase_fields(mut self, fields: BoostMap) -> Self {
        self.phrase_fields = fields;
        self
    }

    pub fn phrase_slop(mut self, slop: u32) -> Self {
        self.phrase_slop = Some(slop);
        self
    }

    pub fn min_match(mut self, mm: impl Into<String>) -> Self {
        self.min_match = Some(mm.into());
        self
    }

    pub fn tie_breaker(mut self, tie: f64) -> Self {
        self.tie_breaker = Some(tie);
        self
    }

    pub fn boost_query(mut self, bq: impl Into<String>) -> Self {
        self.boost_queries.push(bq.into());
        self
    }

    pub fn boost_function(mut self, bf: impl Into<String>) -> Self {
        self.boost_functions.push(bf.into());
        self
    }
}

/// A per-alias field expansion: queries against `alias` search the
/// aliased fields with their boosts (`f.<alias>.qf` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAlias {
    pub alias: String,
    pub fields: BoostMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedDisMaxQuery {
    pub query: String,
    pub query_fields: BoostMap,
    #[serde(default)]
    pub phrase_fields: BoostMap,
    #[serde(default)]
    pub phrase_slop: Option<u32>,
    #[serde(default)]
    pub min_match: Option<String>,
    #[serde(default)]
    pub tie_breaker: Option<f64>,
    #[serde(default)]
    pub boost_queries: Vec<String>,
    #[serde(default)]
    pub boost_functions: Vec<String>,
    #[serde(default)]
    pub user_fields: Vec<String>,
    #[serde(default)]
    pub field_aliases: Vec<FieldAlias>,
    #[serde(default)]
    pub stop_words: Option<bool>,
    #[serde(default)]
    pub lowercase_operators: Option<bool>,
    // slop-tiered phrase boosting: bigram and trigram shingles
    #[serde(default)]
    pub bigram_phrase_fields: BoostMap,
    #[serde(default)]
    pub bigram_phrase_slop: Option<u32>,
    #[serde(default)]
    pub trigram_phrase_fields: BoostMap,
    #[serde(default)]
    pub trigram_phrase_slop: Option<u32>,
}

impl ExtendedDisMaxQuery {
    pub fn new(query: impl Into<String>, query_fields: BoostMap) -> Self {
        Self {
            query: query.into(),
            query_fields,
            phrase_fields: BoostMap::new(),
            phrase_slop: None,
            min_match: None,
            tie_breaker: None,
            boost_queries: Vec::new(),
            boost_functions: Vec::new(),
            user_fields: Vec::new(),
            field_aliases: Vec::new(),
            stop_words: None,
            lowercase_operators: None,
            bigram_phrase_fields: BoostMap::new(),
            bigram_phrase_slop: None,
            trigram_phrase_fields: BoostMap::new(),
            trigram_phrase_slop: None,
        }
    }

    pub fn phrase_fields(mut self, fields: BoostMap) -> Self {
        self.phrase_fields = fields;
        self
    }

    pub fn phrase_slop(mut self, slop: u32) -> Self {
        self.phrase_slop = Some(slop);
        self
    }

    pub fn min_match(mut self, mm: impl Into<String>) -> Self {
        self.min_match = Some(mm.into());
        self
    }

    pub fn tie_breaker(mut self, tie: f64) -> Self {
        self.tie_breaker = Some(tie);
        self
    }

    pub fn boost_query(mut self, bq: impl Into<String>) -> Self {
        self.boost_queries.push(bq.into());
        self
    }

    pub fn boost_function(mut self, bf: impl Into<String>) -> Self {
        self.boost_functions.push(bf.into());
        self
    }

    pub fn user_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn field_alias(mut self, alias: impl Into<String>, fields: BoostMap) -> Self {
        self.field_aliases.push(FieldAlias {
            alias: alias.into(),
            fields,
        });
        self
    }

    pub fn stop_words(mut self, enabled: bool) -> Self {
        self.stop_words = Some(enabled);
        self
    }

    pub fn lowercase_operators(mut self, enabled: bool) -> Self {
        self.lowercase_operators = Some(enabled);
        self
    }

    pub fn bigram_phrase_fields(mut self, fields: BoostMap) -> Self {
        self.bigram_phrase_fields = fields;
        self
    }

    pub fn bigram_phrase_slop(mut self, slop: u32) -> Self {
        self.bigram_phrase_slop = Some(slop);
        self
    }

    pub fn trigram_phrase_fields(mut self, fields: BoostMap) -> Self {
        self.trigram_phrase_fields = fields;
        self
    }

    pub fn trigram_phrase_slop(mut self, slop: u32) -> Self {
        self.trigram_phrase_slop = Some(slop);
        self
    }
}

/// K-nearest-neighbor search over a dense vector field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnQuery {
    pub field: String,
    pub vector: Vec<f64>,
    #[serde(default)]
    pub top_k: Option<u32>,
    /// Explicit candidate pre-filter; when set, every regular filter
    /// stays on `fq` regardless of tags.
    #[serde(default)]
    pub pre_filter: Option<Vec<String>>,
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
}

impl KnnQuery {
    pub fn new(field: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            field: field.into(),
            vector,
            top_k: None,
            pre_filter: None,
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
        }
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn pre_filter<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pre_filter = Some(filters.into_iter().map(Into::into).collect());
        self
    }

    pub fn include_tag(mut self, tag: impl Into<String>) -> Self {
        self.include_tags.push(tag.into());
        self
    }

    pub fn exclude_tag(mut self, tag: impl Into<String>) -> Self {
        self.exclude_tags.push(tag.into());
        self
    }
}

/// KNN where the engine embeds the query text itself with a hosted
/// model; the body is raw text rather than a vector literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnTextToVectorQuery {
    pub field: String,
    pub text: String,
    pub model: String,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl KnnTextToVectorQuery {
    pub fn new(
        field: impl Into<String>,
        text: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            model: model.into(),
            top_k: None,
        }
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.top_k = Some(k);
        self
    }
}

/// Similarity-threshold vector search: return everything above
/// `min_return`, traversing graph edges above `min_traverse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSimilarityQuery {
    pub field: String,
    pub vector: Vec<f64>,
    #[serde(default)]
    pub min_return: Option<f64>,
    #[serde(default)]
    pub min_traverse: Option<f64>,
}

impl VectorSimilarityQuery {
    pub fn new(field: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            field: field.into(),
            vector,
            min_return: None,
            min_traverse: None,
        }
    }

    pub fn min_return(mut self, v: f64) -> Self {
        self.min_return = Some(v);
        self
    }

    pub fn min_traverse(mut self, v: f64) -> Self {
        self.min_traverse = Some(v);
        self
    }
}

/// Radial distance filter around a point; compiles to an appended
/// post-filter, never the primary query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFilterQuery {
    pub field: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in kilometers.
    pub distance: f64,
}

impl GeoFilterQuery {
    pub fn new(field: impl Into<String>, latitude: f64, longitude: f64, distance: f64) -> Self {
        Self {
            field: field.into(),
            latitude,
            longitude,
            distance,
        }
    }
}

/// Bounding-box filter; envelope bounds follow the engine's
/// `ENVELOPE(minX, maxX, maxY, minY)` argument order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BboxQuery {
    pub field: String,
    pub min_x: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_y: f64,
}

impl BboxQuery {
    pub fn new(field: impl Into<String>, min_x: f64, max_x: f64, max_y: f64, min_y: f64) -> Self {
        Self {
            field: field.into(),
            min_x,
            max_x,
            max_y,
            min_y,
        }
    }
}

/// Exact-terms filter over one field, compiled to an appended
/// post-filter with the terms joined by `separator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsQuery {
    pub field: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl TermsQuery {
    pub fn new<I, S>(field: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            separator: None,
            method: None,
            query: None,
        }
    }

    pub fn separator(mut self, sep: impl Into<String>) -> Self {
        self.separator = Some(sep.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}
