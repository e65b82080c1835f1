use chrono::{Duration, Utc};
use progress_core::model::{Badge, MaterialId, UserProgress};
use progress_core::time::fixed_now;
use storage::repository::{PROGRESS_STORAGE_KEY, ProgressRepository};
use storage::sqlite::SqliteRepository;

fn populated_progress() -> UserProgress {
    let day_one = fixed_now();
    let mut progress = UserProgress::default();
    progress.update_progress(&MaterialId::new("javascript-basics"), 35, Some(20), day_one);
    progress.mark_complete(&MaterialId::new("git-fundamentals"), day_one);
    progress.mark_complete(&MaterialId::new("css-flexbox"), day_one + Duration::days(1));
    progress
}

#[tokio::test]
async fn sqlite_round_trips_the_snapshot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load().await.expect("empty load").is_none());

    let progress = populated_progress();
    repo.save(&progress).await.expect("save");
    let loaded = repo.load().await.expect("load").expect("snapshot");

    assert_eq!(loaded, progress);
    assert_eq!(loaded.streak(), 2);
    assert_eq!(
        loaded
            .material(&MaterialId::new("javascript-basics"))
            .unwrap()
            .time_spent(),
        20
    );
}

#[tokio::test]
async fn sqlite_overwrites_under_the_fixed_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut progress = UserProgress::default();
    repo.save(&progress).await.expect("first save");
    progress.mark_complete(&MaterialId::new("scss-advanced"), fixed_now());
    repo.save(&progress).await.expect("second save");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress_snapshots")
        .fetch_one(repo.pool())
        .await
        .expect("count");
    assert_eq!(count, 1);

    let loaded = repo.load().await.expect("load").expect("snapshot");
    assert_eq!(loaded.xp(), 100);
}

#[tokio::test]
async fn malformed_payload_falls_back_to_none() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    sqlx::query("INSERT INTO progress_snapshots (key, payload, updated_at) VALUES (?1, ?2, ?3)")
        .bind(PROGRESS_STORAGE_KEY)
        .bind("{not json at all")
        .bind(Utc::now().to_rfc3339())
        .execute(repo.pool())
        .await
        .expect("insert garbage");

    assert!(repo.load().await.expect("load").is_none());
}

#[tokio::test]
async fn invariant_violating_payload_falls_back_to_none() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_invalid?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    // Well-formed JSON whose stored level disagrees with its xp.
    let payload = r#"{
        "materials": {},
        "totalTimeSpent": 0,
        "streak": 0,
        "badges": [],
        "level": 5,
        "xp": 100
    }"#;
    sqlx::query("INSERT INTO progress_snapshots (key, payload, updated_at) VALUES (?1, ?2, ?3)")
        .bind(PROGRESS_STORAGE_KEY)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(repo.pool())
        .await
        .expect("insert invalid");

    assert!(repo.load().await.expect("load").is_none());
}

#[tokio::test]
async fn badge_names_survive_the_trip() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_badges?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let start = fixed_now();
    let mut progress = UserProgress::default();
    for day in 0..7 {
        progress.mark_complete(&MaterialId::new("daily"), start + Duration::days(day));
    }
    assert!(progress.badges().contains(&Badge::WeekWarrior));

    repo.save(&progress).await.expect("save");
    let loaded = repo.load().await.expect("load").expect("snapshot");
    assert_eq!(loaded.badges(), progress.badges());
    assert!(loaded.badges().contains(&Badge::LevelAchiever(2)));
}