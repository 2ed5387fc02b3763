use autoindex_core::contract::{ListObjectsPage, MockObjectLister, RawObject};
use autoindex_core::listing::list_all_objects;
use mockall::Sequence;

fn page(keys: &[&str], next: Option<&str>, is_truncated: bool) -> ListObjectsPage {
    ListObjectsPage {
        contents: keys.iter().map(|k| RawObject::new(*k, Some(10))).collect(),
        next_continuation_token: next.map(str::to_string),
        is_truncated,
    }
}

#[tokio::test]
async fn test_list_all_objects_concatenates_pages_in_order() {
    let mut lister = MockObjectLister::new();
    let mut seq = Sequence::new();

    let pages = vec![
        (None, page(&["a/1", "a/2"], Some("t1"), true)),
        (Some("t1"), page(&["b/1"], Some("t2"), true)),
        (Some("t2"), page(&[], Some("t3"), true)),
        (Some("t3"), page(&["c/1", "c/2"], None, false)),
    ];

    for (expected_token, response) in pages {
        let expected_token = expected_token.map(str::to_string);
        lister
            .expect_list_objects_page()
            .times(1)
            .in_sequence(&mut seq)
            .withf(move |req| req.bucket == "caian-org" && req.continuation_token == expected_token)
            .return_once(move |_| Ok(response));
    }

    let objects = list_all_objects(&lister, "caian-org")
        .await
        .expect("listing should succeed");

    let keys: Vec<_> = objects.iter().map(|o| o.key.clone().unwrap()).collect();
    assert_eq!(keys, vec!["a/1", "a/2", "b/1", "c/1", "c/2"]);
}

#[tokio::test]
async fn test_list_all_objects_handles_empty_bucket() {
    let mut lister = MockObjectLister::new();
    lister
        .expect_list_objects_page()
        .times(1)
        .return_once(|_| Ok(ListObjectsPage::default()));

    let objects = list_all_objects(&lister, "empty").await.expect("listing should succeed");
    assert!(objects.is_empty(), "empty bucket should yield no objects");
}

#[tokio::test]
async fn test_list_all_objects_stops_when_token_is_missing() {
    let mut lister = MockObjectLister::new();
    lister
        .expect_list_objects_page()
        .times(1)
        .return_once(|_| Ok(page(&["only"], None, true)));

    let objects = list_all_objects(&lister, "bucket").await.expect("listing should succeed");
    assert_eq!(objects.len(), 1);
}

#[tokio::test]
async fn test_list_all_objects_propagates_backend_errors() {
    let mut lister = MockObjectLister::new();
    let mut seq = Sequence::new();
    lister
        .expect_list_objects_page()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(page(&["a"], Some("t1"), true)));
    lister
        .expect_list_objects_page()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Err("AccessDenied".into()));

    let err = list_all_objects(&lister, "bucket").await.unwrap_err();
    assert!(err.to_string().contains("AccessDenied"), "got: {err}");
}
