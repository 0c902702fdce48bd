use bee_core::model::{
    LearnerId, MasteryLevel, NewWord, ProgressRecord, Tier, WordEnrichment, WordId, WordRole,
};
use bee_core::time::fixed_now;
use chrono::Duration;
use storage::StorageError;
use storage::repository::{LearnerRepository, ProgressRepository, WordRepository};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn alternate(spelling: &str, primary: &str, tier: Tier) -> NewWord {
    NewWord::new(
        spelling,
        tier,
        WordRole::Alternate {
            primary: primary.into(),
        },
    )
}

#[tokio::test]
async fn sqlite_roundtrips_words_and_roles() {
    let repo = connect("memdb_words").await;

    let color = repo
        .insert_word(NewWord::new("color", Tier::Two, WordRole::Primary))
        .await
        .unwrap();
    repo.insert_word(alternate("colour", "color", Tier::Two))
        .await
        .unwrap();
    repo.insert_word(NewWord::new("cat", Tier::One, WordRole::Primary))
        .await
        .unwrap();

    assert_eq!(repo.count_words().await.unwrap(), 3);

    let primaries = repo.primary_words(Tier::Two).await.unwrap();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, color);
    assert_eq!(primaries[0].audio_file_local, "audio/two_bee/color.mp3");

    let alts = repo.alternates_of(Tier::Two, "color").await.unwrap();
    assert_eq!(alts.len(), 1);
    assert_eq!(alts[0].spelling, "colour");
    assert_eq!(alts[0].primary_word(), Some("color"));
    assert!(repo.alternates_of(Tier::One, "color").await.unwrap().is_empty());

    assert!(repo.get_word(WordId::new(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_batch_insert_is_all_or_nothing() {
    let repo = connect("memdb_batch").await;
    let side = sqlx::SqlitePool::connect("sqlite:file:memdb_batch?mode=memory&cache=shared")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON words WHEN NEW.word = 'boom' \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .execute(&side)
    .await
    .unwrap();

    let failed = repo
        .insert_words(vec![
            NewWord::new("cat", Tier::One, WordRole::Primary),
            NewWord::new("boom", Tier::One, WordRole::Primary),
        ])
        .await;
    assert!(failed.is_err());
    assert_eq!(repo.count_words().await.unwrap(), 0);

    let ids = repo
        .insert_words(vec![
            NewWord::new("color", Tier::Two, WordRole::Primary),
            alternate("colour", "color", Tier::Two),
        ])
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(repo.alternates_of(Tier::Two, "color").await.unwrap()[0].id, ids[1]);
}

#[tokio::test]
async fn sqlite_updates_enrichment_in_place() {
    let repo = connect("memdb_enrich").await;
    let id = repo
        .insert_word(NewWord::new("ran", Tier::One, WordRole::Primary))
        .await
        .unwrap();

    let data = WordEnrichment {
        word: "ran".into(),
        shortdef: vec!["moved quickly".into()],
        functional_label: Some("past tense".into()),
        pronunciation: Some("ˈran".into()),
        has_audio: true,
        audio_url: Some("https://media.example.test/ran.mp3".into()),
        is_inflection: true,
        base_word: Some("run".into()),
        ..WordEnrichment::default()
    };
    repo.update_enrichment(id, &data).await.unwrap();

    let word = repo.get_word(id).await.unwrap().unwrap();
    assert_eq!(word.definition, "(past tense of run) • moved quickly");
    assert_eq!(word.pronunciation, "ˈran");
    assert!(word.has_audio);
    assert!(word.is_inflection);
    assert_eq!(word.base_word, "run");

    assert!(matches!(
        repo.update_enrichment(WordId::new(404), &data).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_upserts_progress_per_learner_and_word() {
    let repo = connect("memdb_progress").await;
    let learner = repo
        .insert_learner("Avery", false, fixed_now())
        .await
        .unwrap();
    let word = repo
        .insert_word(NewWord::new("bee", Tier::One, WordRole::Primary))
        .await
        .unwrap();

    assert!(repo.get_progress(learner, word).await.unwrap().is_none());

    let first = fixed_now();
    let mut record = ProgressRecord::new(learner, word, first);
    record.record_answer(true, first);
    repo.upsert_progress(&record).await.unwrap();

    let later = first + Duration::hours(2);
    record.record_answer(false, later);
    repo.upsert_progress(&record).await.unwrap();

    let stored = repo.get_progress(learner, word).await.unwrap().unwrap();
    assert_eq!(stored.times_attempted, 2);
    assert_eq!(stored.times_correct, 1);
    assert_eq!(stored.times_incorrect, 1);
    assert_eq!(stored.current_streak, 0);
    assert_eq!(stored.mastery_level, MasteryLevel::MIN);
    assert_eq!(stored.first_attempted_at, first);
    assert_eq!(stored.last_attempted_at, later);
    assert_eq!(stored.next_review_at, later + Duration::minutes(5));

    let all = repo.progress_for_learner(learner).await.unwrap();
    assert_eq!(all, vec![stored]);
    assert!(
        repo.progress_for_learner(LearnerId::new(77))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_learners_are_unique_by_name() {
    let repo = connect("memdb_learners").await;
    let a = repo.insert_learner("Avery", false, fixed_now()).await.unwrap();
    let b = repo.insert_learner("Jordan", false, fixed_now()).await.unwrap();

    let learners = repo.list_learners().await.unwrap();
    assert_eq!(learners.len(), 2);
    assert_eq!(learners[0].id, a);
    assert_eq!(learners[1].username, "Jordan");
    assert_eq!(repo.get_learner(b).await.unwrap().unwrap().created_at, fixed_now());
    assert!(repo.get_learner(LearnerId::new(50)).await.unwrap().is_none());

    assert!(matches!(
        repo.insert_learner("Avery", false, fixed_now()).await,
        Err(StorageError::Conflict)
    ));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.count_words().await.unwrap(), 0);
}
