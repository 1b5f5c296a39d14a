use serde::{Deserialize, Serialize};

/// One result-shaping fragment attached to a QuerySpec. Fragments of
/// the same kind accumulate across calls and are folded into one
/// effective configuration at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultConfig {
    Facet(FacetConfig),
    Group(GroupConfig),
    Highlight(HighlightConfig),
    MoreLikeThis(MoreLikeThisConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetSort {
    Count,
    Index,
}

impl FacetSort {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            FacetSort::Count => "count",
            FacetSort::Index => "index",
        }
    }
}

/// Numeric or date-math range facet over one field. Values pass
/// through verbatim; start/end/gap must be set together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFacet {
    pub field: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub gap: Option<String>,
}

impl RangeFacet {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn gap(mut self, gap: impl Into<String>) -> Self {
        self.gap = Some(gap.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetConfig {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub pivots: Vec<String>,
    #[serde(default)]
    pub mincount: Option<u32>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sort: Option<FacetSort>,
    #[serde(default)]
    pub ranges: Vec<RangeFacet>,
}

impl FacetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn pivot(mut self, pivot: impl Into<String>) -> Self {
        self.pivots.push(pivot.into());
        self
    }

    pub fn mincount(mut self, mincount: u32) -> Self {
        self.mincount = Some(mincount);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: FacetSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn range(mut self, range: RangeFacet) -> Self {
        self.ranges.push(range);
        self
    }

    fn merge_from(&mut self, next: &FacetConfig) {
        union_into(&mut self.fields, &next.fields);
        union_into(&mut self.queries, &next.queries);
        union_into(&mut self.pivots, &next.pivots);
        overwrite(&mut self.mincount, &next.mincount);
        overwrite(&mut self.limit, &next.limit);
        overwrite(&mut self.sort, &next.sort);
        for range in &next.ranges {
            match self.ranges.iter_mut().find(|r| r.field == range.field) {
                Some(existing) => *existing = range.clone(),
                None => self.ranges.push(range.clone()),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupFormat {
    Grouped,
    Simple,
}

impl GroupFormat {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            GroupFormat::Grouped => "grouped",
            GroupFormat::Simple => "simple",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group by field value.
    #[serde(default)]
    pub by: Option<String>,
    /// Group per query; accumulates across calls.
    #[serde(default)]
    pub queries: Vec<String>,
    /// Group by function query result.
    #[serde(default)]
    pub func: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub format: Option<GroupFormat>,
    #[serde(default)]
    pub main: Option<bool>,
    #[serde(default)]
    pub ngroups: Option<bool>,
    #[serde(default)]
    pub truncate: Option<bool>,
    #[serde(default)]
    pub facet: Option<bool>,
}

impl GroupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, field: impl Into<String>) -> Self {
        self.by = Some(field.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.queries.push(query.into());
        self
    }

    pub fn func(mut self, func: impl Into<String>) -> Self {
        self.func = Some(func.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn format(mut self, format: GroupFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn main(mut self, main: bool) -> Self {
        self.main = Some(main);
        self
    }

    pub fn ngroups(mut self, ngroups: bool) -> Self {
        self.ngroups = Some(ngroups);
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn facet(mut self, facet: bool) -> Self {
        self.facet = Some(facet);
        self
    }

    fn merge_from(&mut self, next: &GroupConfig) {
        overwrite(&mut self.by, &next.by);
        union_into(&mut self.queries, &next.queries);
        overwrite(&mut self.func, &next.func);
        overwrite(&mut self.limit, &next.limit);
        overwrite(&mut self.offset, &next.offset);
        overwrite(&mut self.sort, &next.sort);
        overwrite(&mut self.format, &next.format);
        overwrite(&mut self.main, &next.main);
        overwrite(&mut self.ngroups, &next.ngroups);
        overwrite(&mut self.truncate, &next.truncate);
        overwrite(&mut self.facet, &next.facet);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightMethod {
    Unified,
    Original,
    FastVector,
}

impl HighlightMethod {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            HighlightMethod::Unified => "unified",
            HighlightMethod::Original => "original",
            HighlightMethod::FastVector => "fastVector",
        }
    }
}

/// Scalar highlight settings. Used both globally and as field-scoped
/// overrides layered by the merger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightSettings {
    #[serde(default)]
    pub fragment_size: Option<u32>,
    #[serde(default)]
    pub snippets: Option<u32>,
    #[serde(default)]
    pub pre_tag: Option<String>,
    #[serde(default)]
    pub post_tag: Option<String>,
    #[serde(default)]
    pub method: Option<HighlightMethod>,
    #[serde(default)]
    pub require_field_match: Option<bool>,
    #[serde(default)]
    pub boundary_scanner: Option<String>,
}

impl HighlightSettings {
    fn apply(&mut self, next: &HighlightSettings) {
        overwrite(&mut self.fragment_size, &next.fragment_size);
        overwrite(&mut self.snippets, &next.snippets);
        overwrite(&mut self.pre_tag, &next.pre_tag);
        overwrite(&mut self.post_tag, &next.post_tag);
        overwrite(&mut self.method, &next.method);
        overwrite(&mut self.require_field_match, &next.require_field_match);
        overwrite(&mut self.boundary_scanner, &next.boundary_scanner);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(flatten)]
    pub settings: HighlightSettings,
}

impl HighlightConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn fragment_size(mut self, size: u32) -> Self {
        self.settings.fragment_size = Some(size);
        self
    }

    pub fn snippets(mut self, snippets: u32) -> Self {
        self.settings.snippets = Some(snippets);
        self
    }

    pub fn tags(mut self, pre: impl Into<String>, post: impl Into<String>) -> Self {
        self.settings.pre_tag = Some(pre.into());
        self.settings.post_tag = Some(post.into());
        self
    }

    pub fn method(mut self, method: HighlightMethod) -> Self {
        self.settings.method = Some(method);
        self
    }

    pub fn require_field_match(mut self, required: bool) -> Self {
        self.settings.require_field_match = Some(required);
        self
    }

    pub fn boundary_scanner(mut self, scanner: impl Into<String>) -> Self {
        self.settings.boundary_scanner = Some(scanner.into());
        self
    }
}

/// Effective highlight configuration after folding: last-write global
/// scalars plus field-scoped overrides for each field named in a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedHighlight {
    pub fields: Vec<String>,
    pub global: HighlightSettings,
    pub per_field: Vec<(String, HighlightSettings)>,
}

impl MergedHighlight {
    fn merge_from(&mut self, next: &HighlightConfig) {
        union_into(&mut self.fields, &next.fields);
        self.global.apply(&next.settings);
        // this call's scalars apply to the fields it names; a field
        // named again later takes the later scalars per key
        for field in &next.fields {
            match self.per_field.iter_mut().find(|(f, _)| f == field) {
                Some((_, settings)) => settings.apply(&next.settings),
                None => self.per_field.push((field.clone(), next.settings.clone())),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestingTerms {
    None,
    List,
    Details,
}

impl InterestingTerms {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            InterestingTerms::None => "none",
            InterestingTerms::List => "list",
            InterestingTerms::Details => "details",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoreLikeThisConfig {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub min_term_freq: Option<u32>,
    #[serde(default)]
    pub min_doc_freq: Option<u32>,
    #[serde(default)]
    pub max_query_terms: Option<u32>,
    #[serde(default)]
    pub boost: Option<bool>,
    #[serde(default)]
    pub interesting_terms: Option<InterestingTerms>,
    #[serde(default)]
    pub match_include: Option<bool>,
}

impl MoreLikeThisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn min_term_freq(mut self, freq: u32) -> Self {
        self.min_term_freq = Some(freq);
        self
    }

    pub fn min_doc_freq(mut self, freq: u32) -> Self {
        self.min_doc_freq = Some(freq);
        self
    }

    pub fn max_query_terms(mut self, terms: u32) -> Self {
        self.max_query_terms = Some(terms);
        self
    }

    pub fn boost(mut self, boost: bool) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn interesting_terms(mut self, terms: InterestingTerms) -> Self {
        self.interesting_terms = Some(terms);
        self
    }

    pub fn match_include(mut self, include: bool) -> Self {
        self.match_include = Some(include);
        self
    }

    fn merge_from(&mut self, next: &MoreLikeThisConfig) {
        union_into(&mut self.fields, &next.fields);
        overwrite(&mut self.min_term_freq, &next.min_term_freq);
        overwrite(&mut self.min_doc_freq, &next.min_doc_freq);
        overwrite(&mut self.max_query_terms, &next.max_query_terms);
        overwrite(&mut self.boost, &next.boost);
        overwrite(&mut self.interesting_terms, &next.interesting_terms);
        overwrite(&mut self.match_include, &next.match_include);
    }
}

/// One effective configuration per kind, folded left-to-right over the
/// spec's ordered fragment sequence. Folding is total; structural
/// validation happens during compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MergedConfigs {
    pub facet: Option<FacetConfig>,
    pub group: Option<GroupConfig>,
    pub highlight: Option<MergedHighlight>,
    pub more_like_this: Option<MoreLikeThisConfig>,
}

pub(crate) fn merge_configs(configs: &[ResultConfig]) -> MergedConfigs {
    let mut merged = MergedConfigs::default();
    for config in configs {
        match config {
            ResultConfig::Facet(f) => merged
                .facet
                .get_or_insert_with(FacetConfig::default)
                .merge_from(f),
            ResultConfig::Group(g) => merged
                .group
                .get_or_insert_with(GroupConfig::default)
                .merge_from(g),
            ResultConfig::Highlight(h) => merged
                .highlight
                .get_or_insert_with(MergedHighlight::default)
                .merge_from(h),
            ResultConfig::MoreLikeThis(m) => merged
                .more_like_this
                .get_or_insert_with(MoreLikeThisConfig::default)
                .merge_from(m),
        }
    }
    merged
}

// Union preserving first-seen order, case-sensitive exact match.
fn union_into(dst: &mut Vec<String>, src: &[String]) {
    for item in src {
        if !dst.contains(item) {
            dst.push(item.clone());
        }
    }
}

// Last write wins, but only when the later call actually set the field.
fn overwrite<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        *dst = src.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_fields_union_preserves_first_seen_order() {
        let merged = merge_configs(&[
            ResultConfig::Facet(FacetConfig::new().fields(["a", "b"])),
            ResultConfig::Facet(FacetConfig::new().fields(["b", "c"])),
        ]);
        let facet = merged.facet.unwrap();
        assert_eq!(facet.fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn facet_scalars_take_the_last_write() {
        let merged = merge_configs(&[
            ResultConfig::Facet(FacetConfig::new().mincount(1).limit(10)),
            ResultConfig::Facet(FacetConfig::new().mincount(2)),
        ]);
        let facet = merged.facet.unwrap();
        assert_eq!(facet.mincount, Some(2));
        // untouched scalar survives from the earlier call
        assert_eq!(facet.limit, Some(10));
    }

    #[test]
    fn range_facets_merge_keyed_by_field() {
        let merged = merge_configs(&[
            ResultConfig::Facet(
                FacetConfig::new().range(RangeFacet::new("price").start("0").end("100").gap("10")),
            ),
            ResultConfig::Facet(
                FacetConfig::new().range(RangeFacet::new("price").start("0").end("500").gap("50")),
            ),
        ]);
        let facet = merged.facet.unwrap();
        assert_eq!(facet.ranges.len(), 1);
        assert_eq!(facet.ranges[0].end.as_deref(), Some("500"));
    }

    #[test]
    fn group_queries_union_and_scalars_overwrite() {
        let merged = merge_configs(&[
            ResultConfig::Group(GroupConfig::new().query("cat:a").limit(2)),
            ResultConfig::Group(GroupConfig::new().query("cat:b").limit(5)),
        ]);
        let group = merged.group.unwrap();
        assert_eq!(group.queries, vec!["cat:a", "cat:b"]);
        assert_eq!(group.limit, Some(5));
    }

    #[test]
    fn highlight_same_field_takes_later_scalars() {
        let merged = merge_configs(&[
            ResultConfig::Highlight(HighlightConfig::new().fields(["body"]).fragment_size(100)),
            ResultConfig::Highlight(HighlightConfig::new().fields(["body"]).fragment_size(200)),
        ]);
        let hl = merged.highlight.unwrap();
        assert_eq!(hl.global.fragment_size, Some(200));
        assert_eq!(hl.per_field.len(), 1);
        assert_eq!(hl.per_field[0].1.fragment_size, Some(200));
    }

    #[test]
    fn highlight_overrides_scope_to_named_fields() {
        let merged = merge_configs(&[
            ResultConfig::Highlight(HighlightConfig::new().fields(["title"]).fragment_size(80)),
            ResultConfig::Highlight(HighlightConfig::new().fields(["body"]).fragment_size(200)),
        ]);
        let hl = merged.highlight.unwrap();
        assert_eq!(hl.fields, vec!["title", "body"]);
        assert_eq!(hl.global.fragment_size, Some(200));
        let title = &hl.per_field.iter().find(|(f, _)| f == "title").unwrap().1;
        assert_eq!(title.fragment_size, Some(80));
    }

    #[test]
    fn kinds_do_not_bleed_into_each_other() {
        let merged = merge_configs(&[
            ResultConfig::Facet(FacetConfig::new().fields(["a"])),
            ResultConfig::MoreLikeThis(MoreLikeThisConfig::new().fields(["b"])),
        ]);
        assert_eq!(merged.facet.unwrap().fields, vec!["a"]);
        assert_eq!(merged.more_like_this.unwrap().fields, vec!["b"]);
        assert!(merged.group.is_none());
        assert!(merged.highlight.is_none());
    }
}
