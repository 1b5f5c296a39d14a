use tracing::warn;

/// Outcome of classifying a spec's filters for a vector search: the
/// AND-joined candidate pre-filter expression (if any) and the filters
/// that stay on `fq`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFilters {
    pub pre_filter: Option<String>,
    pub post_filters: Vec<String>,
}

/// Split a leading `{!tag=<name>}` prefix off a filter expression.
/// Non-destructive: callers classify on the tag but keep the whole
/// original string.
pub fn split_tag(filter: &str) -> (Option<&str>, &str) {
    if let Some(rest) = filter.strip_prefix("{!tag=") {
        if let Some(end) = rest.find('}') {
            return (Some(&rest[..end]), &rest[end + 1..]);
        }
    }
    (None, filter)
}

/// Classify filters into pre- and post-filter sets. Precedence:
/// explicit `pre_filter` wins outright, then `include_tags`, then
/// `exclude_tags`; with none of those, every filter pre-filters the
/// candidate set (the engine-documented default) unless
/// `implicit_pre_filter` is off.
pub fn resolve(
    filters: &[String],
    pre_filter: Option<&[String]>,
    include_tags: &[String],
    exclude_tags: &[String],
    implicit_pre_filter: bool,
) -> ResolvedFilters {
    if let Some(pre) = pre_filter {
        // explicit pre-filter: used verbatim, every regular filter
        // stays post regardless of tags
        return ResolvedFilters {
            pre_filter: join_pre(pre.iter()),
            post_filters: filters.to_vec(),
        };
    }
    if !include_tags.is_empty() {
        warn_unknown_tags(filters, include_tags);
        let (pre, post): (Vec<_>, Vec<_>) = filters
            .iter()
            .cloned()
            .partition(|f| tag_matches(f, include_tags));
        return ResolvedFilters {
            pre_filter: join_pre(pre.iter()),
            post_filters: post,
        };
    }
    if !exclude_tags.is_empty() {
        warn_unknown_tags(filters, exclude_tags);
        let (post, pre): (Vec<_>, Vec<_>) = filters
            .iter()
            .cloned()
            .partition(|f| tag_matches(f, exclude_tags));
        return ResolvedFilters {
            pre_filter: join_pre(pre.iter()),
            post_filters: post,
        };
    }
    if implicit_pre_filter {
        ResolvedFilters {
            pre_filter: join_pre(filters.iter()),
            post_filters: Vec::new(),
        }
    } else {
        ResolvedFilters {
            pre_filter: None,
            post_filters: filters.to_vec(),
        }
    }
}

fn tag_matches(filter: &str, tags: &[String]) -> bool {
    match split_tag(filter).0 {
        Some(tag) => tags.iter().any(|t| t == tag),
        None => false,
    }
}

fn join_pre<'a>(filters: impl Iterator<Item = &'a String>) -> Option<String> {
    let joined = filters.cloned().collect::<Vec<_>>().join(" AND ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

// A referenced tag that no filter carries matches nothing; report it so
// the caller can spot the typo without failing the build.
fn warn_unknown_tags(filters: &[String], referenced: &[String]) {
    for tag in referenced {
        let present = filters.iter().any(|f| split_tag(f).0 == Some(tag.as_str()));
        if !present {
            warn!(tag = tag.as_str(), "filter tag not present on any filter");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn split_tag_is_non_destructive() {
        assert_eq!(split_tag("{!tag=top}cat:books"), (Some("top"), "cat:books"));
        assert_eq!(split_tag("cat:books"), (None, "cat:books"));
        // unterminated prefix is not a tag
        assert_eq!(split_tag("{!tag=broken"), (None, "{!tag=broken"));
    }

    #[test]
    fn implicit_default_prefilters_everything() {
        let r = resolve(&s(&["a:1", "b:2"]), None, &[], &[], true);
        assert_eq!(r.pre_filter.as_deref(), Some("a:1 AND b:2"));
        assert!(r.post_filters.is_empty());
    }

    #[test]
    fn implicit_default_can_be_disabled() {
        let r = resolve(&s(&["a:1", "b:2"]), None, &[], &[], false);
        assert_eq!(r.pre_filter, None);
        assert_eq!(r.post_filters, s(&["a:1", "b:2"]));
    }

    #[test]
    fn explicit_pre_filter_overrides_tags() {
        let r = resolve(
            &s(&["{!tag=t}a:1", "b:2"]),
            Some(&s(&["c:3"])),
            &s(&["t"]),
            &[],
            true,
        );
        assert_eq!(r.pre_filter.as_deref(), Some("c:3"));
        assert_eq!(r.post_filters, s(&["{!tag=t}a:1", "b:2"]));
    }

    #[test]
    fn empty_explicit_pre_filter_disables_the_implicit_default() {
        let r = resolve(&s(&["a:1"]), Some(&[]), &[], &[], true);
        assert_eq!(r.pre_filter, None);
        assert_eq!(r.post_filters, s(&["a:1"]));
    }

    #[test]
    fn include_tags_select_the_pre_filter_set() {
        let r = resolve(
            &s(&["{!tag=keep}a:1", "{!tag=drop}b:2", "c:3"]),
            None,
            &s(&["keep"]),
            &[],
            true,
        );
        assert_eq!(r.pre_filter.as_deref(), Some("{!tag=keep}a:1"));
        assert_eq!(r.post_filters, s(&["{!tag=drop}b:2", "c:3"]));
    }

    #[test]
    fn exclude_tags_keep_the_rest_pre_filtering() {
        let r = resolve(
            &s(&["{!tag=skip}a:1", "b:2", "c:3"]),
            None,
            &[],
            &s(&["skip"]),
            true,
        );
        assert_eq!(r.pre_filter.as_deref(), Some("b:2 AND c:3"));
        assert_eq!(r.post_filters, s(&["{!tag=skip}a:1"]));
    }

    #[test]
    fn unknown_include_tag_matches_nothing() {
        let r = resolve(&s(&["{!tag=t}a:1"]), None, &s(&["missing"]), &[], true);
        assert_eq!(r.pre_filter, None);
        assert_eq!(r.post_filters, s(&["{!tag=t}a:1"]));
    }
}
