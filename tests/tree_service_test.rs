//! Tree engine behaviour against both store implementations

use std::sync::Arc;

use rstest::rstest;

use orgchart::application::services::TreeService;
use orgchart::application::ApplicationError;
use orgchart::config::{LanguageSettings, StoreSettings};
use orgchart::domain::{DomainError, Language, NodeId};
use orgchart::infrastructure::store::{seed_if_empty, MemoryTreeStore, SqliteTreeStore};
use orgchart::infrastructure::traits::TreeStore;
use orgchart::util::testing::{both_names, init_test_setup, tree_service};

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    Sqlite,
}

fn seeded(backend: Backend) -> Arc<dyn TreeStore> {
    init_test_setup();
    let store: Arc<dyn TreeStore> = match backend {
        Backend::Memory => Arc::new(MemoryTreeStore::new()),
        Backend::Sqlite => Arc::new(SqliteTreeStore::open_in_memory().unwrap()),
    };
    seed_if_empty(store.as_ref()).unwrap();
    store
}

fn ids(nodes: &[orgchart::domain::Node]) -> Vec<i64> {
    nodes.iter().map(|n| n.id.0).collect()
}

#[rstest]
fn given_seed_when_reading_company_then_children_count_is_eleven(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    let company = service.get_by_id(NodeId(5)).unwrap();

    assert_eq!((company.lft, company.rgt, company.level), (1, 24, 1));
    assert_eq!(company.children_count(), 11);
}

#[rstest]
fn given_seed_when_listing_all_then_preorder(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    let all = service.list_all().unwrap();

    assert_eq!(ids(&all), vec![5, 1, 2, 3, 4, 6, 7, 11, 8, 9, 10, 12]);
}

#[rstest]
fn given_company_when_getting_children_then_level_two_nodes_only(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    let company = service.get_by_id(NodeId(5)).unwrap();

    let children = service.get_children(&company).unwrap();

    assert_eq!(ids(&children), vec![1, 2, 3, 4, 6, 7, 10, 12]);
    assert!(children.iter().all(|c| c.level == 2));
}

#[rstest]
fn given_company_when_getting_descendants_then_every_other_node(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    let company = service.get_by_id(NodeId(5)).unwrap();

    let descendants = service.get_descendants(&company).unwrap();

    assert_eq!(descendants.len(), 11);
    assert_eq!(descendants.len() as i64, company.children_count());
}

#[rstest]
fn given_sales_keyword_when_searching_company_then_only_sales(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    let found = service.search_children(NodeId(5), "English", "Sales").unwrap();

    assert_eq!(ids(&found), vec![7]);
    assert_eq!(service.resolve_name(&found[0], "English"), "Sales");
}

#[rstest]
fn given_keyword_shared_by_children_when_searching_then_lft_order_kept(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    // "America", "Italia", "Europa" all contain an "a"
    let found = service.search_children(NodeId(7), "Italian", "A").unwrap();

    assert_eq!(ids(&found), vec![11, 8, 9]);
}

#[rstest]
fn given_leaf_when_searching_children_then_empty(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    assert!(service
        .search_children(NodeId(8), "English", "x")
        .unwrap()
        .is_empty());
}

#[rstest]
fn given_missing_id_when_looking_up_then_not_found(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    assert!(matches!(
        service.get_by_id(NodeId(999)),
        Err(ApplicationError::NotFound(NodeId(999)))
    ));
    assert!(matches!(
        service.search_children(NodeId(999), "English", "x"),
        Err(ApplicationError::NotFound(NodeId(999)))
    ));
}

#[rstest]
fn given_company_when_inserting_test_then_boundaries_shift(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));

    let node = service
        .insert_child(NodeId(5), &both_names("Test", "Prova"))
        .unwrap();

    assert_eq!((node.lft, node.rgt, node.level), (24, 25, 2));
    assert_eq!(node.children_count(), 0);
    let company = service.get_by_id(NodeId(5)).unwrap();
    assert_eq!(company.rgt, 26);
    assert_eq!(company.children_count(), 12);
    // nothing left of the old right boundary moved
    let qa = service.get_by_id(NodeId(12)).unwrap();
    assert_eq!((qa.lft, qa.rgt), (22, 23));
    let company_children = service.get_children(&company).unwrap();
    assert_eq!(company_children.last().map(|n| n.id), Some(node.id));
    assert!(service.check_consistency().unwrap().is_consistent());
}

#[rstest]
fn given_english_only_when_inserting_then_italian_reported_missing(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    let before = service.list_all().unwrap();

    let mut names = both_names("Test", "");
    names.remove("Italian");
    let err = service.insert_child(NodeId(5), &names).unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::MissingNames(missing)) => {
            assert_eq!(missing, vec![Language::Italian])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.list_all().unwrap(), before);
}

#[rstest]
fn given_unsupported_language_when_resolving_then_english_fallback(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let store = seeded(backend);
    let english_only = TreeService::new(
        store.clone(),
        LanguageSettings {
            required: vec![Language::English],
            fallback: Language::English,
        },
        StoreSettings::default(),
    );
    let mut names = both_names("Legal", "");
    names.remove("Italian");
    let legal = english_only.insert_child(NodeId(5), &names).unwrap();

    let service = tree_service(store);
    let sales = service.get_by_id(NodeId(7)).unwrap();
    assert_eq!(service.resolve_name(&sales, "French"), "Sales");
    assert_eq!(service.resolve_name(&legal, "Italian"), "Legal");

    // search does not fall back: the Italian request never sees "Legal"
    assert!(service
        .search_children(NodeId(5), "Italian", "Legal")
        .unwrap()
        .is_empty());
    assert_eq!(
        ids(&service.search_children(NodeId(5), "English", "Legal").unwrap()),
        vec![legal.id.0]
    );
}

#[rstest]
fn given_insertion_sequence_when_checking_after_each_then_invariants_hold(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    let mut parents = vec![5, 7, 8, 1, 12];

    for round in 0..25 {
        let parent_id = NodeId(parents[(round * 7) % parents.len()]);
        let parent_before = service.get_by_id(parent_id).unwrap();

        let node = service
            .insert_child(parent_id, &both_names(&format!("n{round}"), &format!("n{round}")))
            .unwrap();

        assert_eq!(node.lft, parent_before.rgt);
        assert_eq!(node.rgt, node.lft + 1);
        assert_eq!(node.level, parent_before.level + 1);
        let report = service.check_consistency().unwrap();
        assert!(report.is_consistent(), "{:?}", report.violations);
        for n in service.list_all().unwrap() {
            let descendants = service.get_descendants(&n).unwrap();
            assert_eq!(n.children_count(), descendants.len() as i64);
        }
        parents.push(node.id.0);
    }

    assert_eq!(service.list_all().unwrap().len(), 37);
}

#[rstest]
fn given_forest_when_rebuilt_then_agrees_with_interval_children(
    #[values(Backend::Memory, Backend::Sqlite)] backend: Backend,
) {
    let service = tree_service(seeded(backend));
    service
        .insert_child(NodeId(8), &both_names("Milan", "Milano"))
        .unwrap();

    let forest = service.forest("Italian").unwrap();

    assert_eq!(forest.roots().len(), 1);
    assert_eq!(forest.len(), 13);
    assert_eq!(forest.depth(), 4);
    for node in service.list_all().unwrap() {
        let children: Vec<NodeId> = service
            .get_children(&node)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(forest.child_ids(node.id), children, "children of {}", node.id);
    }
    let rendered = forest.to_tree_strings()[0].to_string();
    assert!(rendered.contains("Milano"));
}
