//! End-to-end tests for the normalization pipeline
//!
//! These drive the collection and emission passes through a scripted entry
//! source; no directory server is involved.

use async_trait::async_trait;
use ldaptab::{EntrySource, Error, Normalizer, RawEntry, Result};
use std::collections::VecDeque;

/// Scripted source: a fixed entry sequence, optionally ending in an error.
struct ScriptedSource {
    entries: VecDeque<RawEntry>,
    trailing_error: Option<Error>,
}

impl ScriptedSource {
    fn of(entries: Vec<RawEntry>) -> Self {
        Self {
            entries: entries.into(),
            trailing_error: None,
        }
    }

    fn failing_after(entries: Vec<RawEntry>, error: Error) -> Self {
        Self {
            entries: entries.into(),
            trailing_error: Some(error),
        }
    }
}

#[async_trait]
impl EntrySource for ScriptedSource {
    async fn next_entry(&mut self) -> Result<Option<RawEntry>> {
        match self.entries.pop_front() {
            Some(entry) => Ok(Some(entry)),
            None => match self.trailing_error.take() {
                Some(err) => Err(err),
                None => Ok(None),
            },
        }
    }
}

fn entry(dn: &str, attrs: Vec<(&str, Vec<&str>)>) -> RawEntry {
    let mut e = RawEntry::new(dn);
    for (name, values) in attrs {
        e = e.attr(name, values);
    }
    e
}

#[tokio::test]
async fn every_record_carries_the_attribute_union() {
    let mut source = ScriptedSource::of(vec![
        entry("uid=a,dc=x", vec![("cn", vec!["Alice"]), ("sn", vec!["A"])]),
        entry("uid=b,dc=x", vec![("mail", vec!["b@x.com"])]),
        entry("uid=c,dc=x", vec![("telephoneNumber", vec!["+1 555 0100"])]),
    ]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let expected: Vec<String> = normalizer.universe().iter().map(str::to_string).collect();
    assert!(expected.contains(&"dn".to_string()));

    for record in normalizer.into_records(None) {
        let names: Vec<String> = record.field_names().map(str::to_string).collect();
        assert_eq!(names, expected);
    }
}

#[tokio::test]
async fn spec_example_two_sparse_entries() {
    // entries {dn: A, cn: [Alice]} and {dn: B, mail: [b@x.com]}
    let mut source = ScriptedSource::of(vec![
        entry("A", vec![("cn", vec!["Alice"])]),
        entry("B", vec![("mail", vec!["b@x.com"])]),
    ]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let records: Vec<_> = normalizer.into_records(None).collect();

    assert_eq!(records.len(), 2);

    assert_eq!(records[0].get("dn"), Some(&["A".to_string()][..]));
    assert_eq!(records[0].get("cn"), Some(&["Alice".to_string()][..]));
    assert_eq!(records[0].get("mail"), Some(&[][..]));

    assert_eq!(records[1].get("dn"), Some(&["B".to_string()][..]));
    assert_eq!(records[1].get("cn"), Some(&[][..]));
    assert_eq!(records[1].get("mail"), Some(&["b@x.com".to_string()][..]));
}

#[tokio::test]
async fn emission_order_is_arrival_order() {
    let dns = ["uid=3,dc=x", "uid=1,dc=x", "uid=2,dc=x"];
    let mut source = ScriptedSource::of(dns.iter().map(|dn| entry(dn, vec![])).collect());

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let emitted: Vec<String> = normalizer
        .into_records(None)
        .map(|r| r.dn().unwrap().to_string())
        .collect();

    // Arrival order, never sorted
    assert_eq!(emitted, dns);
}

#[tokio::test]
async fn zero_entries_is_success_with_empty_output() {
    let mut source = ScriptedSource::of(vec![]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    assert_eq!(normalizer.entry_count(), 0);

    let records: Vec<_> = normalizer.into_records(None).collect();
    assert!(records.is_empty());
}

#[tokio::test]
async fn query_error_during_collection_emits_nothing() {
    let mut source = ScriptedSource::failing_after(
        vec![
            entry("uid=a,dc=x", vec![("cn", vec!["Alice"])]),
            entry("uid=b,dc=x", vec![("cn", vec!["Bob"])]),
        ],
        Error::Query("insufficient access rights".into()),
    );

    let err = Normalizer::collect(&mut source).await.unwrap_err();
    assert!(matches!(err, Error::Query(_)));
    // The normalizer was never returned, so there is no stream to emit
    // partial results from
}

#[tokio::test]
async fn limit_caps_records_without_shrinking_the_schema() {
    let mut source = ScriptedSource::of(vec![
        entry("uid=a,dc=x", vec![("cn", vec!["Alice"])]),
        entry("uid=b,dc=x", vec![("mail", vec!["b@x.com"])]),
        entry("uid=c,dc=x", vec![("uid", vec!["c"])]),
    ]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let records: Vec<_> = normalizer.into_records(Some(2)).collect();

    assert_eq!(records.len(), 2);
    // Field contributed by the third (never emitted) entry is still present
    assert_eq!(records[0].get("uid"), Some(&[][..]));
}

#[tokio::test]
async fn padding_twice_changes_nothing() {
    let mut source = ScriptedSource::of(vec![
        entry("uid=a,dc=x", vec![("cn", vec!["Alice"])]),
        entry("uid=b,dc=x", vec![("mail", vec!["b@x.com"])]),
    ]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let universe = normalizer.universe().clone();

    for record in normalizer.into_records(None) {
        let mut fields = record.clone().into_fields();
        universe.pad(&mut fields);
        assert_eq!(fields, record.into_fields());
    }
}

#[tokio::test]
async fn multi_valued_attributes_survive_unchanged() {
    let mut source = ScriptedSource::of(vec![entry(
        "uid=a,dc=x",
        vec![("mail", vec!["a@x.com", "alice@x.com"])],
    )]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let records: Vec<_> = normalizer.into_records(None).collect();

    assert_eq!(
        records[0].get("mail"),
        Some(&["a@x.com".to_string(), "alice@x.com".to_string()][..])
    );
}

#[tokio::test]
async fn records_serialize_for_a_tabular_sink() {
    let mut source = ScriptedSource::of(vec![
        entry("uid=a,dc=x", vec![("cn", vec!["Alice"])]),
        entry("uid=b,dc=x", vec![("mail", vec!["b@x.com"])]),
    ]);

    let normalizer = Normalizer::collect(&mut source).await.unwrap();
    let rows: Vec<serde_json::Value> = normalizer
        .into_records(None)
        .map(|r| serde_json::to_value(&r).unwrap())
        .collect();

    assert_eq!(rows[0]["dn"], serde_json::json!(["uid=a,dc=x"]));
    assert_eq!(rows[0]["mail"], serde_json::json!([]));
    assert_eq!(rows[1]["mail"], serde_json::json!(["b@x.com"]));
}

mod configuration {
    use ldaptab::{ConnectionSpec, Error, Scope, SearchSpec};

    #[test]
    fn binddn_without_password_fails_before_any_connection() {
        let mut spec = ConnectionSpec::new("ldaps://ldap.example.com");
        spec.bind_dn = Some("cn=admin,dc=example,dc=com".to_string());

        let err = spec.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_scope_lists_the_valid_keywords() {
        let err = "invalid".parse::<Scope>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("base"));
        assert!(msg.contains("onelevel"));
        assert!(msg.contains("subtree"));
    }

    #[test]
    fn search_spec_defaults_to_match_all_subtree() {
        let spec = SearchSpec::new("dc=example,dc=com");
        assert_eq!(spec.scope, Scope::Subtree);
        assert_eq!(spec.filter, "(objectClass=*)");
    }
}

mod cancellation {
    use ldaptab::CancelHandle;

    #[test]
    fn handle_is_shared_across_clones() {
        let handle = CancelHandle::new();
        let for_spec = handle.clone();
        assert!(!for_spec.is_cancelled());

        handle.cancel();
        assert!(for_spec.is_cancelled());
    }
}
