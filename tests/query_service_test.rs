//! Query façade: paging and localized failures

use rstest::{fixture, rstest};

use orgchart::application::paging::PageParams;
use orgchart::application::services::{CreateNode, QueryService};
use orgchart::application::ErrorKind;
use orgchart::infrastructure::traits::Caller;
use orgchart::util::testing::{both_names, init_test_setup, query_service, seeded_memory_store};

#[fixture]
fn query() -> QueryService {
    init_test_setup();
    query_service(seeded_memory_store())
}

fn page(num: Option<&str>, size: Option<&str>) -> PageParams {
    PageParams::new(num, size)
}

fn ids(views: &[orgchart::domain::NodeView]) -> Vec<i64> {
    views.iter().map(|v| v.node_id.0).collect()
}

#[rstest]
#[case(Some("0"), None, vec![5, 1, 2, 3, 4])]
#[case(Some("1"), None, vec![6, 7, 11, 8, 9])]
#[case(Some("2"), None, vec![10, 12])]
#[case(Some("1"), Some("4"), vec![4, 6, 7, 11])]
#[case(None, Some("0"), vec![5, 1, 2, 3, 4, 6, 7, 11, 8, 9, 10, 12])]
#[case(Some("0"), Some("1000"), vec![5, 1, 2, 3, 4, 6, 7, 11, 8, 9, 10, 12])]
fn given_page_params_when_listing_then_expected_slice(
    query: QueryService,
    #[case] num: Option<&str>,
    #[case] size: Option<&str>,
    #[case] expected: Vec<i64>,
) {
    let nodes = query.list_nodes(Some("English"), &page(num, size)).unwrap();
    assert_eq!(ids(&nodes), expected);
}

#[rstest]
#[case(Some("3"), None, "English", "Invalid page number requested")]
#[case(Some("-1"), None, "English", "Invalid page number requested")]
#[case(Some("one"), None, "English", "Invalid page number requested")]
#[case(Some(""), None, "English", "Invalid page number requested")]
#[case(None, Some("1001"), "English", "Invalid page size requested")]
#[case(None, Some("-5"), "English", "Invalid page size requested")]
#[case(Some("3"), None, "Italian", "Numero di pagina richiesto non valido")]
#[case(None, Some("x"), "ITALIAN", "Dimensione della pagina richiesta non valida")]
fn given_bad_page_params_when_listing_then_localized_error(
    query: QueryService,
    #[case] num: Option<&str>,
    #[case] size: Option<&str>,
    #[case] language: &str,
    #[case] message: &str,
) {
    let err = query.list_nodes(Some(language), &page(num, size)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(err.message, message);
}

#[rstest]
fn given_italian_when_listing_then_italian_names(query: QueryService) {
    let nodes = query.list_nodes(Some("Italian"), &page(None, Some("0"))).unwrap();
    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names[0], "Azienda");
    assert_eq!(names.len(), 12);
    assert!(names.contains(&"Supporto Vendite"));
}

#[rstest]
fn given_unknown_language_when_getting_then_english_name(query: QueryService) {
    let nodes = query.get_node(5, Some("German")).unwrap();
    assert_eq!(nodes[0].name, "Company");
}

#[rstest]
fn given_missing_node_when_searching_children_then_localized_not_found(query: QueryService) {
    let err = query
        .search_children(999, Some("Italian"), Some("x"), &PageParams::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Non trovato");
}

#[rstest]
fn given_many_matches_when_searching_with_page_size_then_paged(query: QueryService) {
    // every English child name but "Accounting" holds an "e"
    let all = query
        .search_children(5, Some("English"), Some("e"), &page(None, Some("0")))
        .unwrap();
    let second = query
        .search_children(5, Some("English"), Some("e"), &page(Some("1"), Some("2")))
        .unwrap();

    assert!(all.len() > 2);
    assert_eq!(ids(&second), ids(&all[2..all.len().min(4)]));
}

#[rstest]
fn given_empty_search_result_when_first_page_then_empty_not_error(query: QueryService) {
    let nodes = query
        .search_children(5, Some("English"), Some("zzz"), &PageParams::default())
        .unwrap();
    assert!(nodes.is_empty());
}

#[rstest]
fn given_missing_parent_when_creating_then_not_found(query: QueryService) {
    let caller = Caller {
        user_id: 1,
        username: "admin".into(),
    };
    let request = CreateNode::new(999, both_names("Test", "Prova")).in_language("Italian");

    let err = query.create_node(Some(&caller), &request).unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "Non trovato");
}

#[rstest]
fn given_no_parent_id_when_creating_then_missing_params(query: QueryService) {
    let caller = Caller {
        user_id: 1,
        username: "admin".into(),
    };
    let request = CreateNode {
        parent_id: None,
        ..CreateNode::new(5, both_names("Test", "Prova"))
    };

    let err = query.create_node(Some(&caller), &request).unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidArgument);
    assert_eq!(err.message, "Missing mandatory params");
}
