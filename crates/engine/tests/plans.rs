use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CategoryDraft, CategoryKind, Engine, EngineError, ItemDraft, NewItemCmd, NewPlanCmd,
    NoteDraft, NoteKind, Priority, UpdatePlanCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = engine
        .register_user("alice@example.com", "password", Some("Alice"))
        .await
        .unwrap();
    (engine, db, user.id)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn first_category(engine: &Engine, user: Uuid, plan: Uuid) -> Uuid {
    engine.plan_detail(user, plan).await.unwrap().categories[0]
        .category
        .id
}

fn november(budget_cents: i64) -> NewPlanCmd {
    NewPlanCmd::new("November", budget_cents, date(2024, 11, 1), date(2024, 11, 30))
}

#[tokio::test]
async fn create_plan_bootstraps_default_categories() {
    let (engine, _db, user) = engine_with_db().await;

    let plan = engine.create_plan(user, november(500_000)).await.unwrap();
    assert_eq!(plan.background_color, "#FDF7F7");
    assert!(!plan.is_ai_generated);

    let detail = engine.plan_detail(user, plan.id).await.unwrap();
    let titles: Vec<_> = detail
        .categories
        .iter()
        .map(|c| c.category.title.as_str())
        .collect();
    assert_eq!(
        titles,
        ["Housing", "Utilities", "Food", "Transport", "Entertainment", "Other"]
    );
    let positions: Vec<_> = detail
        .categories
        .iter()
        .map(|c| c.category.sort_order)
        .collect();
    assert_eq!(positions, [0, 1, 2, 3, 4, 5]);
    assert_eq!(
        detail
            .categories
            .iter()
            .filter(|c| c.category.kind == CategoryKind::Mandatory)
            .count(),
        4
    );
    assert_eq!(detail.balance.spent_cents, 0);
    assert_eq!(detail.balance.remaining_cents, 500_000);
}

#[tokio::test]
async fn create_plan_rejects_bad_input() {
    let (engine, _db, user) = engine_with_db().await;

    let reversed = NewPlanCmd::new("Bad", 1000, date(2024, 11, 30), date(2024, 11, 1));
    assert!(matches!(
        engine.create_plan(user, reversed).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_plan(user, november(0)).await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine
            .create_plan(user, november(1000).background_color("blue"))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.create_plan(Uuid::new_v4(), november(1000)).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn create_plan_with_details_is_all_or_nothing() {
    let (engine, db, user) = engine_with_db().await;

    let over_budget = vec![
        CategoryDraft::new("Housing", CategoryKind::Mandatory)
            .item(ItemDraft::new("Rent", 800, Priority::Red)),
        CategoryDraft::new("Fun", CategoryKind::Optional)
            .item(ItemDraft::new("Cinema", 300, Priority::Green)),
    ];
    let err = engine
        .create_plan_with_details(user, november(1000).ai_generated(true), over_budget, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BudgetExceeded(_)));

    let blank_item = vec![
        CategoryDraft::new("Housing", CategoryKind::Mandatory)
            .item(ItemDraft::new("  ", 100, Priority::Red)),
    ];
    let err = engine
        .create_plan_with_details(user, november(1000), blank_item, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .create_plan_with_details(user, november(1000), vec![], vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) AS count FROM budget_plans;",
        ))
        .await
        .unwrap()
        .unwrap();
    let count: i64 = row.try_get("", "count").unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn create_plan_with_details_keeps_input_order() {
    let (engine, _db, user) = engine_with_db().await;

    let categories = vec![
        CategoryDraft::new("Housing", CategoryKind::Mandatory)
            .item(ItemDraft::new("Rent", 600, Priority::Red))
            .item(ItemDraft::new("Insurance", 100, Priority::Yellow)),
        CategoryDraft::new("Fun", CategoryKind::Optional)
            .item(ItemDraft::new("Cinema", 300, Priority::Green)),
    ];
    let notes = vec![NoteDraft::new("Cook at home", NoteKind::Ai)];
    let plan = engine
        .create_plan_with_details(user, november(1000).ai_generated(true), categories, notes)
        .await
        .unwrap();
    assert!(plan.is_ai_generated);

    let detail = engine.plan_detail(user, plan.id).await.unwrap();
    assert_eq!(detail.categories.len(), 2);
    assert_eq!(detail.categories[0].category.title, "Housing");
    let housing: Vec<_> = detail.categories[0]
        .items
        .iter()
        .map(|i| (i.title.as_str(), i.sort_order))
        .collect();
    assert_eq!(housing, [("Rent", 0), ("Insurance", 1)]);
    assert!(detail.categories[0].items.iter().all(|i| !i.is_completed));
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].kind, NoteKind::Ai);
}

#[tokio::test]
async fn update_plan_keeps_optional_fields_when_omitted() {
    let (engine, _db, user) = engine_with_db().await;
    let plan = engine
        .create_plan(
            user,
            november(1000).background_color("#112233").ai_generated(true),
        )
        .await
        .unwrap();

    let updated = engine
        .update_plan(
            user,
            plan.id,
            UpdatePlanCmd::new("December", 2000, date(2024, 12, 1), date(2024, 12, 31)),
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "December");
    assert_eq!(updated.budget_cents, 2000);
    assert_eq!(updated.background_color, "#112233");
    assert!(updated.is_ai_generated);

    let updated = engine
        .update_plan(
            user,
            plan.id,
            UpdatePlanCmd::new("December", 2000, date(2024, 12, 1), date(2024, 12, 31))
                .background_color("#445566")
                .ai_generated(false),
        )
        .await
        .unwrap();
    assert_eq!(updated.background_color, "#445566");
    assert!(!updated.is_ai_generated);
}

#[tokio::test]
async fn plans_are_scoped_to_their_owner() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = engine
        .register_user("bob@example.com", "hunter2", None)
        .await
        .unwrap()
        .id;
    let plan = engine.create_plan(alice, november(1000)).await.unwrap();

    assert_eq!(
        engine.plan(bob, plan.id).await.unwrap_err(),
        EngineError::KeyNotFound("plan not exists".to_string())
    );
    assert!(matches!(
        engine.delete_plan(bob, plan.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    let housing = engine.plan_detail(alice, plan.id).await.unwrap().categories[0]
        .category
        .id;
    assert!(matches!(
        engine
            .create_item(bob, plan.id, housing, NewItemCmd::new("Rent", 10, Priority::Red))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_plan_cascades_to_children() {
    let (engine, db, user) = engine_with_db().await;
    let plan = engine.create_plan(user, november(1000)).await.unwrap();
    let housing = engine.plan_detail(user, plan.id).await.unwrap().categories[0]
        .category
        .id;
    engine
        .create_item(user, plan.id, housing, NewItemCmd::new("Rent", 500, Priority::Red))
        .await
        .unwrap();
    engine
        .create_note(user, plan.id, "pay on the 5th", NoteKind::User)
        .await
        .unwrap();

    engine.delete_plan(user, plan.id).await.unwrap();

    assert!(matches!(
        engine.plan(user, plan.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    for table in ["expense_items", "expense_categories", "notes", "budget_plans"] {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                format!("SELECT COUNT(*) AS count FROM {table};"),
            ))
            .await
            .unwrap()
            .unwrap();
        let count: i64 = row.try_get("", "count").unwrap();
        assert_eq!(count, 0, "{table} not empty");
    }
}

#[tokio::test]
async fn duplicate_plan_copies_the_whole_tree_under_new_ids() {
    let (engine, _db, user) = engine_with_db().await;
    let categories = vec![
        CategoryDraft::new("Housing", CategoryKind::Mandatory)
            .item(ItemDraft::new("Rent", 600, Priority::Red))
            .item(ItemDraft::new("Insurance", 100, Priority::Yellow)),
        CategoryDraft::new("Fun", CategoryKind::Optional)
            .item(ItemDraft::new("Cinema", 200, Priority::Green)),
    ];
    let source = engine
        .create_plan_with_details(
            user,
            november(1000),
            categories,
            vec![NoteDraft::new("Cook at home", NoteKind::User)],
        )
        .await
        .unwrap();
    let rent = engine.plan_detail(user, source.id).await.unwrap().categories[0].items[0].id;
    engine.toggle_item(user, rent, Some(true)).await.unwrap();

    let copy = engine.duplicate_plan(user, source.id).await.unwrap();
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.title, "Copy of November");
    assert_eq!(copy.budget_cents, source.budget_cents);

    let original = engine.plan_detail(user, source.id).await.unwrap();
    let copied = engine.plan_detail(user, copy.id).await.unwrap();
    assert_eq!(copied.balance, original.balance);
    assert_eq!(copied.categories.len(), original.categories.len());

    let mut original_ids = Vec::new();
    let mut copied_ids = Vec::new();
    for (a, b) in original.categories.iter().zip(&copied.categories) {
        assert_eq!(a.category.title, b.category.title);
        assert_eq!(a.category.kind, b.category.kind);
        assert_eq!(a.category.sort_order, b.category.sort_order);
        original_ids.push(a.category.id);
        copied_ids.push(b.category.id);
        assert_eq!(a.items.len(), b.items.len());
        for (x, y) in a.items.iter().zip(&b.items) {
            assert_eq!(x.title, y.title);
            assert_eq!(x.amount_cents, y.amount_cents);
            assert_eq!(x.priority, y.priority);
            assert_eq!(x.is_completed, y.is_completed);
            assert_eq!(x.sort_order, y.sort_order);
            original_ids.push(x.id);
            copied_ids.push(y.id);
        }
    }
    assert_eq!(copied.notes.len(), 1);
    assert_eq!(copied.notes[0].content, "Cook at home");
    assert_eq!(copied.notes[0].sort_order, original.notes[0].sort_order);
    original_ids.push(original.notes[0].id);
    copied_ids.push(copied.notes[0].id);

    assert_eq!(copied_ids.len(), 6);
    assert!(copied_ids.iter().all(|id| !original_ids.contains(id)));
}

#[tokio::test]
async fn listing_partitions_active_and_archived_by_period_end() {
    let (engine, _db, user) = engine_with_db().await;
    let october = engine
        .create_plan(
            user,
            NewPlanCmd::new("October", 1000, date(2024, 10, 1), date(2024, 10, 31)),
        )
        .await
        .unwrap();
    let current = engine.create_plan(user, november(1000)).await.unwrap();

    let today = date(2024, 11, 15);
    let active = engine.list_active_plans(user, today).await.unwrap();
    let archived = engine.list_archived_plans(user, today).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].plan.id, current.id);
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].plan.id, october.id);

    // A plan ending today is still active.
    let last_day = engine
        .list_active_plans(user, date(2024, 11, 30))
        .await
        .unwrap();
    assert_eq!(last_day.len(), 1);

    let overview = engine.overview(user, today).await.unwrap();
    assert_eq!(overview.total_plans, 2);
    assert_eq!(overview.active_plans, 1);
    assert_eq!(overview.archived_plans, 1);
    assert_eq!(overview.total_budget_cents, 2000);
}

#[tokio::test]
async fn notes_append_filter_and_replace_advices() {
    let (engine, _db, user) = engine_with_db().await;
    let plan = engine.create_plan(user, november(1000)).await.unwrap();

    engine
        .create_note(user, plan.id, "buy a bike", NoteKind::User)
        .await
        .unwrap();
    assert!(matches!(
        engine.create_note(user, plan.id, "   ", NoteKind::User).await,
        Err(EngineError::InvalidInput(_))
    ));

    let first = engine
        .replace_ai_notes(user, plan.id, vec!["tip one".into(), "tip two".into()])
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    let second = engine
        .replace_ai_notes(user, plan.id, vec!["fresh tip".into()])
        .await
        .unwrap();
    assert_eq!(second.len(), 1);

    let ai = engine
        .list_notes(user, plan.id, Some(NoteKind::Ai))
        .await
        .unwrap();
    assert_eq!(ai.len(), 1);
    assert_eq!(ai[0].content, "fresh tip");

    let all = engine.list_notes(user, plan.id, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].content, "buy a bike");

    let note = engine
        .update_note(user, all[0].id, "buy a used bike", NoteKind::User)
        .await
        .unwrap();
    assert_eq!(note.content, "buy a used bike");
    engine.delete_note(user, note.id).await.unwrap();
    assert_eq!(engine.list_notes(user, plan.id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn register_and_authenticate() {
    let (engine, _db, alice) = engine_with_db().await;

    let user = engine
        .authenticate(" ALICE@example.com ", "password")
        .await
        .unwrap();
    assert_eq!(user.id, alice);
    assert_eq!(user.name.as_deref(), Some("Alice"));

    assert!(matches!(
        engine.authenticate("alice@example.com", "wrong").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .register_user("Alice@Example.com", "other", None)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine.register_user("not-an-email", "pw", None).await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn monthly_comparison_groups_plans_by_start_month() {
    let (engine, _db, alice) = engine_with_db().await;

    let plan = |title: &str, budget: i64, start: NaiveDate, end: NaiveDate| {
        NewPlanCmd::new(title, budget, start, end)
    };
    let september = engine
        .create_plan(alice, plan("September", 700, date(2024, 9, 1), date(2024, 9, 30)))
        .await
        .unwrap();
    let october = engine
        .create_plan(alice, plan("October", 1000, date(2024, 10, 1), date(2024, 10, 31)))
        .await
        .unwrap();
    engine
        .create_plan(alice, plan("November", 2000, date(2024, 11, 1), date(2024, 11, 30)))
        .await
        .unwrap();
    let late_november = engine
        .create_plan(alice, plan("Trip", 500, date(2024, 11, 15), date(2024, 12, 15)))
        .await
        .unwrap();

    let october_housing = first_category(&engine, alice, october.id).await;
    engine
        .create_item(
            alice,
            october.id,
            october_housing,
            NewItemCmd::new("Rent", 300, Priority::Red).completed(true),
        )
        .await
        .unwrap();
    engine
        .create_item(
            alice,
            october.id,
            october_housing,
            NewItemCmd::new("Repairs", 200, Priority::Yellow),
        )
        .await
        .unwrap();
    engine
        .create_item(
            alice,
            late_november.id,
            first_category(&engine, alice, late_november.id).await,
            NewItemCmd::new("Hostel", 100, Priority::Green).completed(true),
        )
        .await
        .unwrap();

    let bob = engine
        .register_user("bob@example.com", "password", None)
        .await
        .unwrap();
    engine
        .create_plan(bob.id, plan("Bob", 9999, date(2024, 11, 1), date(2024, 11, 30)))
        .await
        .unwrap();

    let months = engine.monthly_comparison(alice, 6).await.unwrap();
    let rows: Vec<_> = months
        .iter()
        .map(|m| (m.month, m.budget_cents, m.spent_cents))
        .collect();
    assert_eq!(
        rows,
        [
            (date(2024, 11, 1), 2500, 100),
            (date(2024, 10, 1), 1000, 300),
            (date(2024, 9, 1), 700, 0),
        ]
    );

    assert_eq!(engine.monthly_comparison(alice, 2).await.unwrap().len(), 2);
    assert_eq!(engine.monthly_comparison(alice, 1000).await.unwrap().len(), 3);
    assert!(matches!(
        engine.monthly_comparison(alice, 0).await,
        Err(EngineError::InvalidInput(_))
    ));

    engine.delete_plan(alice, september.id).await.unwrap();
    assert_eq!(engine.monthly_comparison(alice, 6).await.unwrap().len(), 2);
}
