use crate::config::{merge_configs, FacetConfig, GroupConfig, HighlightSettings, MergedHighlight, MoreLikeThisConfig};
use crate::encode;
use crate::errors::{CompileError, Result};
use crate::filters;
use crate::local_params::LocalParams;
use crate::params::{ParamValue, ParameterMap};
use crate::parser::{
    BboxQuery, BoostMap, DisMaxQuery, ExtendedDisMaxQuery, GeoFilterQuery, KnnQuery,
    KnnTextToVectorQuery, QueryParser, StandardQuery, TermsQuery, VectorSimilarityQuery,
};
use crate::spec::QuerySpec;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// When no tags and no explicit pre-filter are given on a KNN
    /// query, every filter pre-filters the candidate set. That is the
    /// engine-documented default; turn this off to keep such filters
    /// on `fq` instead.
    pub implicit_pre_filter: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            implicit_pre_filter: true,
        }
    }
}

/// Compile a QuerySpec into its flat wire parameters. Pure and
/// all-or-nothing: the same spec always yields the same map, and no
/// partial map escapes on error.
pub fn compile(spec: &QuerySpec) -> Result<ParameterMap> {
    compile_with(spec, &CompileOptions::default())
}

pub fn compile_with(spec: &QuerySpec, opts: &CompileOptions) -> Result<ParameterMap> {
    let mut map = ParameterMap::new();
    let mut post_filters = spec.common.filters.clone();

    match &spec.parser {
        QueryParser::Standard(q) => emit_standard(&mut map, q)?,
        QueryParser::DisMax(q) => emit_dismax(&mut map, q)?,
        QueryParser::ExtendedDisMax(q) => emit_edismax(&mut map, q)?,
        QueryParser::Knn(q) => emit_knn(&mut map, q, opts, &mut post_filters)?,
        QueryParser::KnnTextToVector(q) => emit_knn_text(&mut map, q)?,
        QueryParser::VectorSimilarity(q) => emit_vector_similarity(&mut map, q)?,
        QueryParser::GeoFilter(q) => emit_geofilt(&mut map, q, &mut post_filters)?,
        QueryParser::Bbox(q) => emit_bbox(&mut map, q, &mut post_filters)?,
        QueryParser::Terms(q) => emit_terms(&mut map, q, &mut post_filters)?,
    }

    map.set_opt("rows", spec.common.rows);
    map.set_opt("start", spec.common.start);
    if !spec.common.fields.is_empty() {
        map.set("fl", encode::encode_field_list(&spec.common.fields));
    }
    map.set_opt("sort", spec.common.sort.clone());
    if !post_filters.is_empty() {
        map.set("fq", ParamValue::List(post_filters));
    }

    let merged = merge_configs(&spec.configs);
    if let Some(facet) = &merged.facet {
        emit_facet(&mut map, facet)?;
    }
    if let Some(group) = &merged.group {
        emit_group(&mut map, group);
    }
    if let Some(highlight) = &merged.highlight {
        emit_highlight(&mut map, highlight);
    }
    if let Some(mlt) = &merged.more_like_this {
        emit_more_like_this(&mut map, mlt);
    }
    Ok(map)
}

fn require(value: &str, parser: &'static str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(CompileError::MissingRequiredField { parser, field });
    }
    Ok(())
}

fn emit_standard(map: &mut ParameterMap, q: &StandardQuery) -> Result<()> {
    require(&q.query, "standard", "query")?;
    map.set("q", q.query.clone());
    map.set("defType", "lucene");
    map.set_opt("q.op", q.operator.map(|op| op.as_str()));
    map.set_opt("df", q.default_field.clone());
    map.set_opt("sow", q.split_on_whitespace);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_dismax_core(
    map: &mut ParameterMap,
    parser: &'static str,
    query: &str,
    query_fields: &BoostMap,
    phrase_fields: &BoostMap,
    phrase_slop: Option<u32>,
    min_match: Option<&String>,
    tie_breaker: Option<f64>,
    boost_queries: &[String],
    boost_functions: &[String],
) -> Result<()> {
    require(query, parser, "query")?;
    if query_fields.is_empty() {
        return Err(CompileError::MissingRequiredField {
            parser,
            field: "query_fields",
        });
    }
    map.set("q", query.to_string());
    map.set("defType", parser);
    map.set("qf", encode::encode_boost_map(query_fields.pairs()));
    if !phrase_fields.is_empty() {
        map.set("pf", encode::encode_boost_map(phrase_fields.pairs()));
    }
    map.set_opt("ps", phrase_slop);
    map.set_opt("mm", min_match.cloned());
    map.set_opt("tie", tie_breaker);
    if !boost_queries.is_empty() {
        map.set("bq", ParamValue::List(boost_queries.to_vec()));
    }
    if !boost_functions.is_empty() {
        map.set("bf", ParamValue::List(boost_functions.to_vec()));
    }
    Ok(())
}

fn emit_dismax(map: &mut ParameterMap, q: &DisMaxQuery) -> Result<()> {
    emit_dismax_core(
        map,
        "dismax",
        &q.query,
        &q.query_fields,
        &q.phrase_fields,
        q.phrase_slop,
        q.min_match.as_ref(),
        q.tie_breaker,
        &q.boost_queries,
        &q.boost_functions,
    )
}

fn emit_edismax(map: &mut ParameterMap, q: &ExtendedDisMaxQuery) -> Result<()> {
    emit_dismax_core(
        map,
        "edismax",
        &q.query,
        &q.query_fields,
        &q.phrase_fields,
        q.phrase_slop,
        q.min_match.as_ref(),
        q.tie_breaker,
        &q.boost_queries,
        &q.boost_functions,
    )?;
    if !q.user_fields.is_empty() {
        map.set("uf", q.user_fields.join(" "));
    }
    for alias in &q.field_aliases {
        map.set(
            format!("f.{}.qf", alias.alias),
            encode::encode_boost_map(alias.fields.pairs()),
        );
    }
    map.set_opt("stopwords", q.stop_words);
    map.set_opt("lowercaseOperators", q.lowercase_operators);
    if !q.bigram_phrase_fields.is_empty() {
        map.set("pf2", encode::encode_boost_map(q.bigram_phrase_fields.pairs()));
    }
    map.set_opt("ps2", q.bigram_phrase_slop);
    if !q.trigram_phrase_fields.is_empty() {
        map.set("pf3", encode::encode_boost_map(q.trigram_phrase_fields.pairs()));
    }
    map.set_opt("ps3", q.trigram_phrase_slop);
    Ok(())
}

fn emit_knn(
    map: &mut ParameterMap,
    q: &KnnQuery,
    opts: &CompileOptions,
    post_filters: &mut Vec<String>,
) -> Result<()> {
    require(&q.field, "knn", "field")?;
    let body = encode::encode_vector(&q.vector)?;
    let resolved = filters::resolve(
        post_filters,
        q.pre_filter.as_deref(),
        &q.include_tags,
        &q.exclude_tags,
        opts.implicit_pre_filter,
    );
    let local = LocalParams::new("knn")
        .pair("f", &q.field)
        .pair_opt("topK", q.top_k.map(|k| k.to_string()))
        .pair_opt("preFilter", resolved.pre_filter);
    map.set("q", format!("{}{}", local, body));
    *post_filters = resolved.post_filters;
    Ok(())
}

fn emit_knn_text(map: &mut ParameterMap, q: &KnnTextToVectorQuery) -> Result<()> {
    require(&q.field, "knn_text_to_vector", "field")?;
    require(&q.text, "knn_text_to_vector", "text")?;
    require(&q.model, "knn_text_to_vector", "model")?;
    let local = LocalParams::new("knn_text_to_vector")
        .pair("f", &q.field)
        .pair_opt("topK", q.top_k.map(|k| k.to_string()))
        .pair("model", &q.model);
    map.set("q", format!("{}{}", local, q.text));
    Ok(())
}

fn emit_vector_similarity(map: &mut ParameterMap, q: &VectorSimilarityQuery) -> Result<()> {
    require(&q.field, "vectorSimilarity", "field")?;
    let body = encode::encode_vector(&q.vector)?;
    let local = LocalParams::new("vectorSimilarity")
        .pair("f", &q.field)
        .pair_opt("minReturn", q.min_return.map(encode::encode_number))
        .pair_opt("minTraverse", q.min_traverse.map(encode::encode_number));
    map.set("q", format!("{}{}", local, body));
    Ok(())
}

fn emit_geofilt(
    map: &mut ParameterMap,
    q: &GeoFilterQuery,
    post_filters: &mut Vec<String>,
) -> Result<()> {
    require(&q.field, "geofilt", "spatial_field")?;
    let local = LocalParams::new("geofilt")
        .pair("sfield", &q.field)
        .pair(
            "pt",
            format!(
                "{},{}",
                encode::encode_number(q.latitude),
                encode::encode_number(q.longitude)
            ),
        )
        .pair("d", encode::encode_number(q.distance));
    map.set("q", "*:*");
    // appended, never replacing what the caller already filtered on
    post_filters.push(local.to_string());
    Ok(())
}

fn emit_bbox(map: &mut ParameterMap, q: &BboxQuery, post_filters: &mut Vec<String>) -> Result<()> {
    require(&q.field, "bbox", "bbox_field")?;
    let local = LocalParams::new("bbox").pair("f", &q.field);
    let envelope = format!(
        "Intersects(ENVELOPE({},{},{},{}))",
        encode::encode_number(q.min_x),
        encode::encode_number(q.max_x),
        encode::encode_number(q.max_y),
        encode::encode_number(q.min_y)
    );
    map.set("q", "*:*");
    post_filters.push(format!("{}{}", local, envelope));
    Ok(())
}

fn emit_terms(map: &mut ParameterMap, q: &TermsQuery, post_filters: &mut Vec<String>) -> Result<()> {
    require(&q.field, "terms", "field")?;
    if q.terms.is_empty() {
        return Err(CompileError::MissingRequiredField {
            parser: "terms",
            field: "terms",
        });
    }
    let separator = q.separator.as_deref().unwrap_or(",");
    let mut local = LocalParams::new("terms").pair("f", &q.field);
    if separator != "," {
        local = local.pair("separator", separator);
    }
    local = local.pair_opt("method", q.method.clone());
    map.set("q", q.query.clone().unwrap_or_else(|| "*:*".to_string()));
    post_filters.push(format!("{}{}", local, q.terms.join(separator)));
    Ok(())
}

fn emit_facet(map: &mut ParameterMap, facet: &FacetConfig) -> Result<()> {
    // validate before the first facet key lands in the map
    for range in &facet.ranges {
        let set = [&range.start, &range.end, &range.gap];
        if set.iter().any(|v| v.is_none()) {
            return Err(CompileError::ConflictingRangeFacet {
                field: range.field.clone(),
            });
        }
    }
    map.set("facet", true);
    if !facet.fields.is_empty() {
        map.set("facet.field", ParamValue::List(facet.fields.clone()));
    }
    if !facet.queries.is_empty() {
        map.set("facet.query", ParamValue::List(facet.queries.clone()));
    }
    if !facet.pivots.is_empty() {
        map.set("facet.pivot", ParamValue::List(facet.pivots.clone()));
    }
    map.set_opt("facet.mincount", facet.mincount);
    map.set_opt("facet.limit", facet.limit.map(ParamValue::Int));
    map.set_opt("facet.sort", facet.sort.map(|s| s.as_str()));
    if !facet.ranges.is_empty() {
        let fields: Vec<String> = facet.ranges.iter().map(|r| r.field.clone()).collect();
        map.set("facet.range", ParamValue::List(fields));
        for range in &facet.ranges {
            map.set(
                format!("f.{}.facet.range.start", range.field),
                range.start.clone().unwrap_or_default(),
            );
            map.set(
                format!("f.{}.facet.range.end", range.field),
                range.end.clone().unwrap_or_default(),
            );
            map.set(
                format!("f.{}.facet.range.gap", range.field),
                range.gap.clone().unwrap_or_default(),
            );
        }
    }
    Ok(())
}

fn emit_group(map: &mut ParameterMap, group: &GroupConfig) {
    map.set("group", true);
    map.set_opt("group.field", group.by.clone());
    if !group.queries.is_empty() {
        map.set("group.query", ParamValue::List(group.queries.clone()));
    }
    map.set_opt("group.func", group.func.clone());
    map.set_opt("group.limit", group.limit);
    map.set_opt("group.offset", group.offset);
    map.set_opt("group.sort", group.sort.clone());
    map.set_opt("group.format", group.format.map(|f| f.as_str()));
    map.set_opt("group.main", group.main);
    map.set_opt("group.ngroups", group.ngroups);
    map.set_opt("group.truncate", group.truncate);
    map.set_opt("group.facet", group.facet);
}

fn emit_highlight(map: &mut ParameterMap, highlight: &MergedHighlight) {
    map.set("hl", true);
    if !highlight.fields.is_empty() {
        map.set("hl.fl", encode::encode_field_list(&highlight.fields));
    }
    emit_highlight_settings(map, "hl", &highlight.global);
    for (field, settings) in &highlight.per_field {
        // only where the field diverges from the merged global value
        let overrides = diff_settings(settings, &highlight.global);
        emit_highlight_settings(map, &format!("f.{}.hl", field), &overrides);
    }
}

fn emit_highlight_settings(map: &mut ParameterMap, prefix: &str, s: &HighlightSettings) {
    map.set_opt(format!("{}.fragsize", prefix), s.fragment_size);
    map.set_opt(format!("{}.snippets", prefix), s.snippets);
    map.set_opt(format!("{}.simple.pre", prefix), s.pre_tag.clone());
    map.set_opt(format!("{}.simple.post", prefix), s.post_tag.clone());
    map.set_opt(format!("{}.method", prefix), s.method.map(|m| m.as_str()));
    map.set_opt(
        format!("{}.requireFieldMatch", prefix),
        s.require_field_match,
    );
    map.set_opt(format!("{}.bs.type", prefix), s.boundary_scanner.clone());
}

fn diff_settings(field: &HighlightSettings, global: &HighlightSettings) -> HighlightSettings {
    fn keep<T: Clone + PartialEq>(field: &Option<T>, global: &Option<T>) -> Option<T> {
        match field {
            Some(v) if field != global => Some(v.clone()),
            _ => None,
        }
    }
    HighlightSettings {
        fragment_size: keep(&field.fragment_size, &global.fragment_size),
        snippets: keep(&field.snippets, &global.snippets),
        pre_tag: keep(&field.pre_tag, &global.pre_tag),
        post_tag: keep(&field.post_tag, &global.post_tag),
        method: keep(&field.method, &global.method),
        require_field_match: keep(&field.require_field_match, &global.require_field_match),
        boundary_scanner: keep(&field.boundary_scanner, &global.boundary_scanner),
    }
}

fn emit_more_like_this(map: &mut ParameterMap, mlt: &MoreLikeThisConfig) {
    map.set("mlt", true);
    if !mlt.fields.is_empty() {
        map.set("mlt.fl", encode::encode_field_list(&mlt.fields));
    }
    map.set_opt("mlt.mintf", mlt.min_term_freq);
    map.set_opt("mlt.mindf", mlt.min_doc_freq);
    map.set_opt("mlt.maxqt", mlt.max_query_terms);
    map.set_opt("mlt.boost", mlt.boost);
    map.set_opt(
        "mlt.interestingTerms",
        mlt.interesting_terms.map(|t| t.as_str()),
    );
    map.set_opt("mlt.match.include", mlt.match_include);
}
