use agora_core::config::{AgoraConfig, IdStrategy};
use agora_core::engine::Intent;
use agora_core::model::{PostDraft, PostEdit};
use agora_core::query::{CategoryFilter, SortMode};
use agora_core::seed::SeedData;
use agora_core::view::{Control, PostCard};
use agora_core::{ForumError, ForumStore};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn seeded_store() -> ForumStore {
    agora_core::telemetry::init_tracing();
    ForumStore::new(SeedData::builtin().expect("seed"), &AgoraConfig::default()).expect("store")
}

fn empty_store() -> ForumStore {
    let mut seed = SeedData::builtin().expect("seed");
    seed.posts.clear();
    ForumStore::new(seed, &AgoraConfig::default()).expect("store")
}

#[test]
fn upvote_scenario_matches_original_feed() {
    let mut store = seeded_store();
    let first = store.toggle_upvote("1").expect("upvote 1");
    assert_eq!((first.upvotes, first.is_upvoted), (43, true));
    let second = store.toggle_upvote("2").expect("upvote 2");
    assert_eq!((second.upvotes, second.is_upvoted), (34, false));
}

#[test]
fn toggling_every_post_twice_restores_the_feed() {
    let mut store = seeded_store();
    let before = store.snapshot();
    for post in before.posts() {
        store.toggle_upvote(&post.id).unwrap();
        store.toggle_upvote(&post.id).unwrap();
    }
    assert_eq!(store.snapshot().posts(), before.posts());
}

#[test]
fn comments_keep_count_and_list_in_step() {
    let mut store = seeded_store();
    for text in ["first", "second", "  padded  "] {
        let previous = store.get_post("1").unwrap();
        let next = store.add_comment("1", text).unwrap();
        assert_eq!(next.comments, previous.comments + 1);
        assert_eq!(
            next.comments_list.as_ref().map(Vec::len),
            previous.comments_list.as_ref().map(|list| list.len() + 1)
        );
        assert_eq!(next.comments as usize, next.comments_list.unwrap().len());
    }
}

#[test]
fn blank_comments_leave_the_collection_alone() {
    let mut store = seeded_store();
    let before = store.snapshot();
    for text in ["", "   "] {
        let err = store.add_comment("1", text).unwrap_err();
        assert!(matches!(err, ForumError::Validation(_)));
    }
    assert_eq!(store.snapshot().posts(), before.posts());
    assert_eq!(store.revision(), 0);
}

#[test]
fn missing_targets_are_not_found() {
    let mut store = seeded_store();
    assert!(store.get_post("nope").unwrap_err().is_not_found());
    assert!(store.toggle_upvote("nope").unwrap_err().is_not_found());
    assert!(store.toggle_bookmark("nope").unwrap_err().is_not_found());
    assert!(store.add_comment("nope", "hi").unwrap_err().is_not_found());
    assert!(store.delete_post("nope").unwrap_err().is_not_found());
    let err = store
        .edit_post(
            "nope",
            PostEdit {
                title: "t".into(),
                content: "c".into(),
                image: None,
            },
        )
        .unwrap_err();
    assert_eq!(err, ForumError::post_not_found("nope"));
}

#[test]
fn create_on_empty_collection_uses_defaults() {
    let mut store = empty_store();
    let post = store
        .create_post(PostDraft::new("Hi", "Body"))
        .expect("create");
    assert_eq!(post.upvotes, 0);
    assert_eq!(post.comments, 0);
    assert!(!post.is_bookmarked);
    assert!(!post.is_upvoted);
    assert_eq!(post.category, "General");
    assert_eq!(post.author.id, store.viewer().id);
    assert_eq!(store.list_posts(&CategoryFilter::All, SortMode::Latest).len(), 1);
}

#[test]
fn created_ids_are_unique_across_deletes() {
    let config = AgoraConfig {
        id_strategy: IdStrategy::Sequential,
        ..AgoraConfig::default()
    };
    let mut store = ForumStore::new(SeedData::builtin().unwrap(), &config).unwrap();
    let mut seen: HashSet<String> = store
        .snapshot()
        .posts()
        .iter()
        .map(|post| post.id.clone())
        .collect();
    for round in 0..5 {
        let post = store
            .create_post(PostDraft::new(format!("Round {round}"), "Body"))
            .unwrap();
        assert!(seen.insert(post.id.clone()), "id {} reused", post.id);
        store.delete_post(&post.id).unwrap();
    }
}

#[test]
fn create_rejects_empty_fields() {
    let mut store = seeded_store();
    let err = store.create_post(PostDraft::new("", "Body")).unwrap_err();
    assert!(err.is_validation());
    let err = store.create_post(PostDraft::new("Title", " ")).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn edit_then_list_reflects_new_title() {
    let mut store = seeded_store();
    store
        .edit_post(
            "3",
            PostEdit {
                title: "React 18, six months in".into(),
                content: "Updated thoughts".into(),
                image: None,
            },
        )
        .unwrap();
    let mine = store.my_threads();
    assert_eq!(mine[0].title, "React 18, six months in");
    assert_eq!(mine[0].image, None);
    assert_eq!(mine[0].upvotes, 25);
}

#[test]
fn listings_sort_and_filter() {
    let store = seeded_store();
    let popular = store.list_posts(&CategoryFilter::All, SortMode::Popular);
    assert!(popular.windows(2).all(|w| w[0].upvotes >= w[1].upvotes));
    let latest = store.list_posts(&CategoryFilter::All, SortMode::Latest);
    assert!(latest.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let all = store.list_posts(&CategoryFilter::parse("all"), SortMode::Latest);
    assert_eq!(all.len(), store.snapshot().len());

    let programming = store.list_posts(&"programming".into(), SortMode::Popular);
    let ids: Vec<_> = programming.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn category_pages() {
    let store = seeded_store();
    let names: Vec<_> = store
        .list_categories("design")
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["UI/UX Design"]);
    assert_eq!(store.trending_categories().len(), 3);

    let design = store.posts_in_category("3", SortMode::Latest).unwrap();
    assert_eq!(design.len(), 1);
    assert_eq!(design[0].id, "2");
    assert!(store
        .posts_in_category("42", SortMode::Latest)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn bookmarks_follow_toggles() {
    let mut store = seeded_store();
    assert_eq!(store.bookmarks().len(), 1);
    store.toggle_bookmark("1").unwrap();
    store.toggle_bookmark("2").unwrap();
    let ids: Vec<_> = store.bookmarks().into_iter().map(|post| post.id).collect();
    assert_eq!(ids, vec!["1".to_string()]);
}

#[test]
fn search_finds_posts_by_text() {
    let store = seeded_store();
    let found = store.search_posts("typescript");
    let ids: Vec<_> = found.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[test]
fn feed_and_detail_views_stay_consistent() {
    let mut store = seeded_store();
    let mut feed_card = PostCard::new(store.get_post("1").unwrap());
    let mut detail_card = PostCard::new(store.get_post("1").unwrap());

    feed_card.click(Control::Upvote, &mut store).unwrap();
    detail_card.comment("Great intro", &mut store).unwrap();

    assert_eq!(detail_card.post().upvotes, 43);
    assert_eq!(detail_card.post().comments, 3);
    assert_eq!(store.get_post("1").unwrap(), *detail_card.post());
}

#[test]
fn intents_serialize_for_replay() {
    let mut store = seeded_store();
    let script = r#"[
        {"kind": "toggle_upvote", "post_id": "1"},
        {"kind": "add_comment", "post_id": "1", "text": "replayed"},
        {"kind": "create_post", "draft": {"title": "Replay", "content": "Body"}},
        {"kind": "delete_post", "post_id": "4"}
    ]"#;
    let intents: Vec<Intent> = serde_json::from_str(script).unwrap();
    for intent in intents {
        store.dispatch(intent).unwrap();
    }
    assert_eq!(store.revision(), 4);
    assert_eq!(store.get_post("1").unwrap().upvotes, 43);
    assert!(store.get_post("4").is_err());
    assert_eq!(store.search_posts("replay").len(), 1);
}
