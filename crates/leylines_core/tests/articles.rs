use leylines_core::db::open_db_in_memory;
use leylines_core::model::article::QUICK_BOARD_SUMMARY;
use leylines_core::{
    ArticlePatch, ArticleService, EntityKind, NewArticle, NewPostIt, PostItService,
    ServiceError, SqliteArticleRepository, SqlitePostItRepository,
};
use rusqlite::params;
use uuid::Uuid;

fn article(title: &str, content: &str, tags: &[&str]) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..NewArticle::default()
    }
}

#[test]
fn blank_title_is_replaced_by_article_id() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let created = service.create(article("   ", "body", &[])).unwrap();

    assert_eq!(created.title, created.id.to_string());
    assert_eq!(created.version, 1);
    assert!(!created.is_published);
    assert_eq!(created.created_at, created.updated_at);
}

#[test]
fn quick_create_returns_empty_unpublished_board() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let board = service.quick_create().unwrap();

    assert_eq!(board.title, board.id.to_string());
    assert_eq!(board.summary, QUICK_BOARD_SUMMARY);
    assert!(board.content.is_empty());
    assert!(board.tags.is_empty());
    assert_eq!(board.version, 1);
}

#[test]
fn create_normalizes_tags_ignoring_case() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let created = service
        .create(article("Plan", "", &["Research", " research ", "", "ideas"]))
        .unwrap();

    assert_eq!(
        created.tags,
        vec!["ideas".to_string(), "Research".to_string()]
    );
}

#[test]
fn update_bumps_version_once_per_call_and_moves_updated_at_forward() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));
    let created = service.create(article("Plan", "v1", &[])).unwrap();

    let first = service
        .update_by_id(
            created.id,
            ArticlePatch {
                content: Some("v2".to_string()),
                is_published: Some(true),
                ..ArticlePatch::default()
            },
        )
        .unwrap();
    assert_eq!(first.version, 2);
    assert_eq!(first.content, "v2");
    assert!(first.is_published);
    assert!(first.updated_at > created.updated_at);

    let second = service
        .update_by_id(created.id, ArticlePatch::default())
        .unwrap();
    assert_eq!(second.version, 3);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, created.created_at);
}

#[test]
fn update_ignores_blank_title_and_replaces_tags_when_present() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));
    let created = service.create(article("Plan", "", &["a", "b"])).unwrap();

    let updated = service
        .update_by_id(
            created.id,
            ArticlePatch {
                title: Some("  ".to_string()),
                tags: Some(vec!["c".to_string()]),
                ..ArticlePatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Plan");
    assert_eq!(updated.tags, vec!["c".to_string()]);
}

#[test]
fn update_unknown_article_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let err = service
        .update_by_id(Uuid::new_v4(), ArticlePatch::default())
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::Article,
            ..
        }
    ));
}

#[test]
fn find_by_id_returns_none_for_unknown_article() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    assert!(service.find_by_id(Uuid::new_v4()).unwrap().is_none());
    assert!(matches!(
        service.require(Uuid::new_v4()).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn delete_cascades_to_post_its() {
    let conn = open_db_in_memory().unwrap();
    let articles = ArticleService::new(SqliteArticleRepository::new(&conn));
    let postits = PostItService::new(SqlitePostItRepository::new(&conn));

    let board = articles.quick_create().unwrap();
    let other = articles.quick_create().unwrap();
    for content in ["one", "two"] {
        postits
            .create(NewPostIt {
                article_id: board.id,
                content: content.to_string(),
                ..NewPostIt::default()
            })
            .unwrap();
    }
    postits
        .create(NewPostIt {
            article_id: other.id,
            content: "survivor".to_string(),
            ..NewPostIt::default()
        })
        .unwrap();

    articles.delete_by_id(board.id).unwrap();

    assert!(articles.find_by_id(board.id).unwrap().is_none());
    assert_eq!(postits.count_by_article_id(board.id).unwrap(), 0);
    assert_eq!(postits.count_by_article_id(other.id).unwrap(), 1);
    assert!(matches!(
        articles.delete_by_id(board.id).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn find_all_paginates_newest_update_first() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let mut ids = Vec::new();
    for index in 0..5 {
        let created = service.create(article(&format!("board {index}"), "", &[])).unwrap();
        conn.execute(
            "UPDATE articles SET updated_at = ?2 WHERE id = ?1;",
            params![created.id.to_string(), 1_000 + index],
        )
        .unwrap();
        ids.push(created.id);
    }

    let first_page = service.find_all(Some(1), Some(2), Vec::new(), None).unwrap();
    assert_eq!(first_page.pagination.total, 5);
    assert_eq!(first_page.pagination.pages, 3);
    assert_eq!(first_page.pagination.limit, 2);
    assert_eq!(
        first_page.items.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![ids[4], ids[3]]
    );

    let last_page = service.find_all(Some(3), Some(2), Vec::new(), None).unwrap();
    assert_eq!(last_page.items.len(), 1);
    assert_eq!(last_page.items[0].id, ids[0]);

    let past_end = service.find_all(Some(9), Some(2), Vec::new(), None).unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.pagination.total, 5);
}

#[test]
fn find_all_clamps_limit_and_page() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));
    service.quick_create().unwrap();

    let page = service.find_all(Some(0), Some(5_000), Vec::new(), None).unwrap();
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, 100);

    let defaults = service.find_all(None, None, Vec::new(), None).unwrap();
    assert_eq!(defaults.pagination.limit, 10);
}

#[test]
fn tag_filter_and_search_fold_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let cafe = service
        .create(article("Café ÉCLAIR", "Über ideas", &["Été"]))
        .unwrap();
    service.create(article("Plain", "nothing", &[])).unwrap();

    let by_tag = service
        .find_all(None, None, vec!["ÉTÉ".to_string()], None)
        .unwrap();
    assert_eq!(by_tag.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![cafe.id]);

    let by_title = service
        .find_all(None, None, Vec::new(), Some("éclair".to_string()))
        .unwrap();
    assert_eq!(by_title.pagination.total, 1);

    let by_content = service
        .find_all(None, None, Vec::new(), Some("ÜBER".to_string()))
        .unwrap();
    assert_eq!(by_content.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![cafe.id]);

    let removed = service.remove_tags(cafe.id, vec!["été".to_string()]).unwrap();
    assert!(removed.tags.is_empty());
}

#[test]
fn find_all_filters_by_tag_and_search() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));

    let research = service
        .create(article("Lab notes", "sample 100% pure", &["Research"]))
        .unwrap();
    let ideas = service
        .create(article("Roadmap", "next quarter", &["ideas"]))
        .unwrap();
    service.create(article("Misc", "nothing", &[])).unwrap();

    let by_tag = service
        .find_all(None, None, vec!["research".to_string()], None)
        .unwrap();
    assert_eq!(by_tag.items.len(), 1);
    assert_eq!(by_tag.items[0].id, research.id);

    let any_tag = service
        .find_all(
            None,
            None,
            vec!["Research".to_string(), "IDEAS".to_string()],
            None,
        )
        .unwrap();
    assert_eq!(any_tag.pagination.total, 2);

    let by_title = service
        .find_all(None, None, Vec::new(), Some("ROAD".to_string()))
        .unwrap();
    assert_eq!(by_title.items.len(), 1);
    assert_eq!(by_title.items[0].id, ideas.id);

    let literal_percent = service
        .find_all(None, None, Vec::new(), Some("100%".to_string()))
        .unwrap();
    assert_eq!(literal_percent.items.len(), 1);
    assert_eq!(literal_percent.items[0].id, research.id);

    let combined = service
        .find_all(
            None,
            None,
            vec!["ideas".to_string()],
            Some("lab".to_string()),
        )
        .unwrap();
    assert!(combined.items.is_empty());
}

#[test]
fn add_and_remove_tags_edit_membership_without_bumping_version() {
    let conn = open_db_in_memory().unwrap();
    let service = ArticleService::new(SqliteArticleRepository::new(&conn));
    let created = service.create(article("Plan", "", &["a"])).unwrap();

    let added = service
        .add_tags(created.id, vec!["B".to_string(), "A".to_string()])
        .unwrap();
    assert_eq!(added.tags, vec!["a".to_string(), "B".to_string()]);
    assert_eq!(added.version, 1);
    assert!(added.updated_at > created.updated_at);

    let removed = service
        .remove_tags(created.id, vec!["b".to_string(), "missing".to_string()])
        .unwrap();
    assert_eq!(removed.tags, vec!["a".to_string()]);
    assert_eq!(removed.version, 1);

    assert!(matches!(
        service
            .add_tags(Uuid::new_v4(), vec!["x".to_string()])
            .unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}
