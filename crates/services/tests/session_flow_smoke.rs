use std::sync::Arc;

use bee_core::catalog::Catalog;
use bee_core::model::{LearnerId, LearnerKey, Tier};
use bee_core::time::fixed_now;
use services::enrichment::NoEnrichment;
use services::{AppServices, Clock, DrillError, DrillService};
use storage::repository::{ProgressRepository, Storage, WordRepository};

async fn services() -> AppServices {
    let storage = Storage::in_memory();
    let clock = Clock::fixed(fixed_now());
    let drill = Arc::new(
        DrillService::new(
            clock,
            Arc::clone(&storage.words),
            Arc::clone(&storage.progress),
        )
        .with_seed(42),
    );
    let app = AppServices::with_drill(storage, clock, drill);
    let catalog = Catalog::from_json(
        r#"{"one_bee": ["cat", "dog", "sun"], "two_bee": [["color", "colour"]]}"#,
    )
    .unwrap();
    app.bootstrap(&catalog, &NoEnrichment, &["Avery".to_owned()])
        .await
        .unwrap();
    app
}

async fn spelling_of(app: &AppServices, id: bee_core::model::WordId) -> String {
    app.storage()
        .words
        .get_word(id)
        .await
        .unwrap()
        .unwrap()
        .spelling
}

#[tokio::test]
async fn correct_answer_records_progress_and_draws_a_new_card() {
    let app = services().await;
    let sessions = app.sessions();
    let learner = app.learners().list().await.unwrap()[0].id;
    let key = LearnerKey::Named(learner);

    let card = sessions.current_card(key).await.unwrap();
    assert_eq!(card.tier, Tier::One);
    assert_eq!(card.stats.len(), 3);
    assert_eq!(card.stats[0].stats.not_started, 3);
    assert!(!card.show_hint);
    assert!(card.hint.is_none());

    let again = sessions.current_card(key).await.unwrap();
    assert_eq!(again.word.id, card.word.id);
    assert_eq!(again.scrambled, card.scrambled);

    let spelling = spelling_of(&app, card.word.id).await;
    let outcome = sessions
        .submit_answer(key, card.word.id, &spelling.to_uppercase())
        .await
        .unwrap();
    assert!(outcome.correct);
    assert_ne!(outcome.card.word.id, card.word.id);
    assert_eq!(outcome.card.stats[0].stats.in_progress, 1);

    let record = app
        .storage()
        .progress
        .get_progress(learner, card.word.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.times_correct, 1);
    assert_eq!(record.current_streak, 1);
}

#[tokio::test]
async fn wrong_answer_keeps_the_card() {
    let app = services().await;
    let sessions = app.sessions();
    let key = LearnerKey::Named(LearnerId::new(1));

    let card = sessions.current_card(key).await.unwrap();
    let outcome = sessions
        .submit_answer(key, card.word.id, "zzzz")
        .await
        .unwrap();

    assert!(!outcome.correct);
    assert_eq!(outcome.card.word.id, card.word.id);
    assert_eq!(outcome.card.scrambled, card.scrambled);
}

#[tokio::test]
async fn guest_answers_are_never_recorded() {
    let app = services().await;
    let sessions = app.sessions();

    let card = sessions.current_card(LearnerKey::Guest).await.unwrap();
    assert!(card.stats.is_empty());
    assert_eq!(card.user_id, "guest");

    let spelling = spelling_of(&app, card.word.id).await;
    let outcome = sessions
        .submit_answer(LearnerKey::Guest, card.word.id, &spelling)
        .await
        .unwrap();
    assert!(outcome.correct);

    for learner in app.learners().list().await.unwrap() {
        assert!(
            app.storage()
                .progress
                .progress_for_learner(learner.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}

#[tokio::test]
async fn hint_toggle_preserves_typed_answer() {
    let app = services().await;
    let sessions = app.sessions();
    let key = LearnerKey::Guest;
    let first = sessions.current_card(key).await.unwrap();

    let shown = sessions
        .toggle_hint(key, Some("ca".into()))
        .await
        .unwrap();
    assert!(shown.show_hint);
    assert!(shown.hint.is_some());
    assert_eq!(shown.current_answer, "ca");
    assert_eq!(shown.word.id, first.word.id);

    let hidden = sessions.toggle_hint(key, None).await.unwrap();
    assert!(!hidden.show_hint);
    assert_eq!(hidden.current_answer, "ca");
    assert_eq!(hidden.word.id, shown.word.id);
}

#[tokio::test]
async fn tier_switch_draws_from_the_new_tier_and_accepts_alternates() {
    let app = services().await;
    let sessions = app.sessions();
    let key = LearnerKey::Guest;

    sessions.current_card(key).await.unwrap();
    let card = sessions.set_tier(key, Tier::Two).await.unwrap();
    assert_eq!(card.tier, Tier::Two);
    assert_eq!(spelling_of(&app, card.word.id).await, "color");

    let outcome = sessions
        .submit_answer(key, card.word.id, "colour")
        .await
        .unwrap();
    assert!(outcome.correct);

    let empty = sessions.set_tier(key, Tier::Three).await;
    assert!(matches!(empty, Err(DrillError::Scheduler(_))));
}
