use solrkit_core::{
    BboxQuery, BoostMap, CompileOptions, DisMaxQuery, ExtendedDisMaxQuery, FacetConfig,
    GeoFilterQuery, GroupConfig, HighlightConfig, KnnQuery, KnnTextToVectorQuery,
    MoreLikeThisConfig, ParamValue, QueryOperator, QuerySpec, RangeFacet, StandardQuery,
    TermsQuery, VectorSimilarityQuery,
};

fn get_str(map: &solrkit_core::ParameterMap, key: &str) -> String {
    match map.get(key) {
        Some(ParamValue::Str(s)) => s.clone(),
        other => panic!("expected string under {key}, got {other:?}"),
    }
}

#[test]
fn standard_query_with_rows() {
    let map = QuerySpec::new(StandardQuery::new("python AND programming"))
        .with_rows(5)
        .compile()
        .unwrap();
    assert_eq!(get_str(&map, "q"), "python AND programming");
    assert_eq!(map.get("rows"), Some(&ParamValue::Int(5)));
    assert_eq!(get_str(&map, "defType"), "lucene");
    assert_eq!(map.len(), 3);
}

#[test]
fn standard_optional_fields() {
    let map = QuerySpec::new(
        StandardQuery::new("title:rust")
            .operator(QueryOperator::And)
            .default_field("body")
            .split_on_whitespace(false),
    )
    .compile()
    .unwrap();
    assert_eq!(get_str(&map, "q.op"), "AND");
    assert_eq!(get_str(&map, "df"), "body");
    assert_eq!(map.get("sow"), Some(&ParamValue::Bool(false)));
}

#[test]
fn knn_query_exact_wire_shape() {
    let map = QuerySpec::new(KnnQuery::new("embedding", vec![0.1, 0.2]).top_k(10))
        .compile()
        .unwrap();
    assert_eq!(get_str(&map, "q"), "{!knn f=embedding topK=10}[0.1,0.2]");
}

#[test]
fn knn_default_prefilters_all_filters() {
    let map = QuerySpec::new(KnnQuery::new("embedding", vec![0.1]).top_k(10))
        .with_filters(["a:1", "b:2"])
        .compile()
        .unwrap();
    assert_eq!(
        get_str(&map, "q"),
        "{!knn f=embedding topK=10 preFilter='a:1 AND b:2'}[0.1]"
    );
    assert!(map.get("fq").is_none());
}

#[test]
fn knn_explicit_pre_filter_isolates_fq() {
    let map = QuerySpec::new(
        KnnQuery::new("embedding", vec![0.1])
            .top_k(10)
            .pre_filter(["a:1"]),
    )
    .with_filter("b:2")
    .compile()
    .unwrap();
    assert_eq!(
        get_str(&map, "q"),
        "{!knn f=embedding topK=10 preFilter=a:1}[0.1]"
    );
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec!["b:2".to_string()]))
    );
}

#[test]
fn knn_include_tags_choose_prefilter_set() {
    let map = QuerySpec::new(
        KnnQuery::new("embedding", vec![0.1])
            .include_tag("cheap"),
    )
    .with_filters(["{!tag=cheap}price:[0 TO 10]", "cat:books"])
    .compile()
    .unwrap();
    assert_eq!(
        get_str(&map, "q"),
        "{!knn f=embedding preFilter='{!tag=cheap}price:[0 TO 10]'}[0.1]"
    );
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec!["cat:books".to_string()]))
    );
}

#[test]
fn knn_implicit_prefilter_can_be_disabled() {
    let spec = QuerySpec::new(KnnQuery::new("embedding", vec![0.1])).with_filter("a:1");
    let opts = CompileOptions {
        implicit_pre_filter: false,
    };
    let map = solrkit_core::compile_with(&spec, &opts).unwrap();
    assert_eq!(get_str(&map, "q"), "{!knn f=embedding}[0.1]");
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec!["a:1".to_string()]))
    );
}

#[test]
fn knn_text_to_vector_keeps_raw_text_body() {
    let map = QuerySpec::new(
        KnnTextToVectorQuery::new("embedding", "how do leases expire", "my-model").top_k(5),
    )
    .compile()
    .unwrap();
    assert_eq!(
        get_str(&map, "q"),
        "{!knn_text_to_vector f=embedding topK=5 model=my-model}how do leases expire"
    );
}

#[test]
fn vector_similarity_thresholds() {
    let map = QuerySpec::new(
        VectorSimilarityQuery::new("embedding", vec![0.5, 0.25])
            .min_return(0.7)
            .min_traverse(0.3),
    )
    .compile()
    .unwrap();
    assert_eq!(
        get_str(&map, "q"),
        "{!vectorSimilarity f=embedding minReturn=0.7 minTraverse=0.3}[0.5,0.25]"
    );
}

#[test]
fn geofilt_appends_to_existing_filters() {
    let map = QuerySpec::new(GeoFilterQuery::new("store", 45.15, -93.85, 5.0))
        .with_filter("open:true")
        .compile()
        .unwrap();
    assert_eq!(get_str(&map, "q"), "*:*");
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec![
            "open:true".to_string(),
            "{!geofilt sfield=store pt=45.15,-93.85 d=5}".to_string(),
        ]))
    );
}

#[test]
fn bbox_filter_uses_envelope_bound_order() {
    let map = QuerySpec::new(BboxQuery::new("geo", -10.0, 10.0, 20.0, -20.0))
        .compile()
        .unwrap();
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec![
            "{!bbox f=geo}Intersects(ENVELOPE(-10,10,20,-20))".to_string(),
        ]))
    );
}

#[test]
fn terms_filter_appends_not_replaces() {
    let map = QuerySpec::new(TermsQuery::new("tags", ["a", "b"]))
        .with_filter("x:1")
        .compile()
        .unwrap();
    assert_eq!(get_str(&map, "q"), "*:*");
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec![
            "x:1".to_string(),
            "{!terms f=tags}a,b".to_string(),
        ]))
    );
}

#[test]
fn terms_custom_separator_and_method() {
    let map = QuerySpec::new(
        TermsQuery::new("tags", ["a", "b"])
            .separator("|")
            .method("booleanQuery")
            .query("cat:books"),
    )
    .compile()
    .unwrap();
    assert_eq!(get_str(&map, "q"), "cat:books");
    assert_eq!(
        map.get("fq"),
        Some(&ParamValue::List(vec![
            "{!terms f=tags separator=| method=booleanQuery}a|b".to_string(),
        ]))
    );
}

#[test]
fn dismax_full_surface() {
    let map = QuerySpec::new(
        DisMaxQuery::new(
            "rust web",
            BoostMap::new().field("title", 2.0).field("body", 1.0),
        )
        .phrase_fields(BoostMap::new().field("title", 5.0))
        .phrase_slop(2)
        .min_match("2<75%")
        .tie_breaker(0.1)
        .boost_query("featured:true^10")
        .boost_function("recip(age,1,1000,1000)"),
    )
    .compile()
    .unwrap();
    assert_eq!(get_str(&map, "defType"), "dismax");
    assert_eq!(get_str(&map, "qf"), "title^2 body");
    assert_eq!(get_str(&map, "pf"), "title^5");
    assert_eq!(map.get("ps"), Some(&ParamValue::Int(2)));
    assert_eq!(get_str(&map, "mm"), "2<75%");
    assert_eq!(map.get("tie"), Some(&ParamValue::Float(0.1)));
    assert_eq!(
        map.get("bq"),
        Some(&ParamValue::List(vec!["featured:true^10".to_string()]))
    );
    assert_eq!(
        map.get("bf"),
        Some(&ParamValue::List(vec![
            "recip(age,1,1000,1000)".to_string()
        ]))
    );
}

#[test]
fn edismax_extras() {
    let map = QuerySpec::new(
        ExtendedDisMaxQuery::new("rust", BoostMap::new().field("title", 1.0))
            .user_fields(["title", "*_s"])
            .field_alias("who", BoostMap::new().field("author", 3.0).field("editor", 1.0))
            .stop_words(false)
            .lowercase_operators(true)
            .bigram_phrase_fields(BoostMap::new().field("body", 2.0))
            .bigram_phrase_slop(1)
            .trigram_phrase_fields(BoostMap::new().field("body", 3.0))
            .trigram_phrase_slop(2),
    )
    .compile()
    .unwrap();
    assert_eq!(get_str(&map, "defType"), "edismax");
    assert_eq!(get_str(&map, "uf"), "title *_s");
    assert_eq!(get_str(&map, "f.who.qf"), "author^3 editor");
    assert_eq!(map.get("stopwords"), Some(&ParamValue::Bool(false)));
    assert_eq!(map.get("lowercaseOperators"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "pf2"), "body^2");
    assert_eq!(map.get("ps2"), Some(&ParamValue::Int(1)));
    assert_eq!(get_str(&map, "pf3"), "body^3");
    assert_eq!(map.get("ps3"), Some(&ParamValue::Int(2)));
}

#[test]
fn facet_calls_union_across_the_chain() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_facet(FacetConfig::new().fields(["a"]))
        .with_facet(FacetConfig::new().fields(["b"]).mincount(1))
        .compile()
        .unwrap();
    assert_eq!(map.get("facet"), Some(&ParamValue::Bool(true)));
    assert_eq!(
        map.get("facet.field"),
        Some(&ParamValue::List(vec!["a".to_string(), "b".to_string()]))
    );
    assert_eq!(map.get("facet.mincount"), Some(&ParamValue::Int(1)));
}

#[test]
fn range_facet_emits_per_field_keys() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_facet(
            FacetConfig::new().range(RangeFacet::new("price").start("0").end("100").gap("10")),
        )
        .compile()
        .unwrap();
    assert_eq!(
        map.get("facet.range"),
        Some(&ParamValue::List(vec!["price".to_string()]))
    );
    assert_eq!(get_str(&map, "f.price.facet.range.start"), "0");
    assert_eq!(get_str(&map, "f.price.facet.range.end"), "100");
    assert_eq!(get_str(&map, "f.price.facet.range.gap"), "10");
}

#[test]
fn grouping_block() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_group(
            GroupConfig::new()
                .by("author")
                .limit(3)
                .ngroups(true)
                .format(solrkit_core::GroupFormat::Simple),
        )
        .compile()
        .unwrap();
    assert_eq!(map.get("group"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "group.field"), "author");
    assert_eq!(map.get("group.limit"), Some(&ParamValue::Int(3)));
    assert_eq!(map.get("group.ngroups"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "group.format"), "simple");
}

#[test]
fn highlight_last_write_wins_on_same_field() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_highlight(HighlightConfig::new().fields(["body"]).fragment_size(100))
        .with_highlight(HighlightConfig::new().fields(["body"]).fragment_size(200))
        .compile()
        .unwrap();
    assert_eq!(map.get("hl"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "hl.fl"), "body");
    assert_eq!(map.get("hl.fragsize"), Some(&ParamValue::Int(200)));
    // no redundant per-field override when it matches the global value
    assert!(map.get("f.body.hl.fragsize").is_none());
}

#[test]
fn highlight_divergent_field_gets_override_key() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_highlight(HighlightConfig::new().fields(["title"]).fragment_size(80))
        .with_highlight(
            HighlightConfig::new()
                .fields(["body"])
                .fragment_size(200)
                .tags("<em>", "</em>"),
        )
        .compile()
        .unwrap();
    assert_eq!(get_str(&map, "hl.fl"), "title,body");
    assert_eq!(map.get("hl.fragsize"), Some(&ParamValue::Int(200)));
    assert_eq!(map.get("f.title.hl.fragsize"), Some(&ParamValue::Int(80)));
    assert_eq!(get_str(&map, "hl.simple.pre"), "<em>");
    assert_eq!(get_str(&map, "hl.simple.post"), "</em>");
}

#[test]
fn more_like_this_block() {
    let map = QuerySpec::new(StandardQuery::new("id:42"))
        .with_more_like_this(
            MoreLikeThisConfig::new()
                .fields(["body", "title"])
                .min_term_freq(2)
                .min_doc_freq(5)
                .max_query_terms(25)
                .boost(true)
                .interesting_terms(solrkit_core::InterestingTerms::List)
                .match_include(false),
        )
        .compile()
        .unwrap();
    assert_eq!(map.get("mlt"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "mlt.fl"), "body,title");
    assert_eq!(map.get("mlt.mintf"), Some(&ParamValue::Int(2)));
    assert_eq!(map.get("mlt.mindf"), Some(&ParamValue::Int(5)));
    assert_eq!(map.get("mlt.maxqt"), Some(&ParamValue::Int(25)));
    assert_eq!(map.get("mlt.boost"), Some(&ParamValue::Bool(true)));
    assert_eq!(get_str(&map, "mlt.interestingTerms"), "list");
    assert_eq!(map.get("mlt.match.include"), Some(&ParamValue::Bool(false)));
}

#[test]
fn common_params_round_out_the_map() {
    let map = QuerySpec::new(StandardQuery::new("*:*"))
        .with_rows(20)
        .with_start(40)
        .with_fields(["id", "score", "len:strlen(name)"])
        .with_sort("score desc")
        .compile()
        .unwrap();
    assert_eq!(map.get("rows"), Some(&ParamValue::Int(20)));
    assert_eq!(map.get("start"), Some(&ParamValue::Int(40)));
    assert_eq!(get_str(&map, "fl"), "id,score,len:strlen(name)");
    assert_eq!(get_str(&map, "sort"), "score desc");
}

#[test]
fn compile_twice_is_structurally_equal() {
    let spec = QuerySpec::new(
        KnnQuery::new("embedding", vec![0.1, 0.2, 0.3])
            .top_k(7)
            .exclude_tag("late"),
    )
    .with_filters(["{!tag=late}recent:true", "cat:books"])
    .with_facet(FacetConfig::new().fields(["cat"]).mincount(1))
    .with_highlight(HighlightConfig::new().fields(["body"]).snippets(2));
    assert_eq!(spec.compile().unwrap(), spec.compile().unwrap());
}

#[test]
fn spec_survives_json_round_trip() {
    let spec = QuerySpec::new(KnnQuery::new("embedding", vec![0.1, 0.2]).top_k(10))
        .with_rows(5)
        .with_filter("cat:books")
        .with_facet(FacetConfig::new().fields(["cat"]));
    let json = serde_json::to_string(&spec).unwrap();
    let back: QuerySpec = serde_json::from_str(&json).unwrap();
    assert_eq!(spec, back);
    assert_eq!(spec.compile().unwrap(), back.compile().unwrap());
}
