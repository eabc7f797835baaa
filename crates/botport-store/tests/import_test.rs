//! Dispatching batches into a real database

use botport_entities::{activity, bot_responses, conversations, projects, slots, SettingKind};
use botport_import::ImportDispatcher;
use botport_import_types::{
    ConversationRecord, ConversationsPayload, DomainPayload, ImportFile, ImportParams,
    ImportPayload, IncomingPayload, ProjectConfigPayload, RasaConfigPayload, RawTextPayload, ResponseTemplate,
    SlotDefinition, Utterance,
};
use botport_store::test_utils::TestDatabase;
use botport_store::SeaOrmSettingsStore;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde_json::json;

fn domain(responses: &[(&str, &str)], slots: &[(&str, &str)]) -> ImportFile {
    ImportFile::new(
        "domain.yml",
        ImportPayload::Domain(DomainPayload {
            responses: responses
                .iter()
                .map(|(key, text)| {
                    ResponseTemplate::new(*key).with_message("en", &format!("text: {}", text))
                })
                .collect(),
            slots: slots
                .iter()
                .map(|(name, slot_type)| SlotDefinition::new(*name, *slot_type))
                .collect(),
        }),
    )
}

fn conversations_file(ids: &[&str]) -> ImportFile {
    ImportFile::new(
        "conversations.json",
        ImportPayload::Conversations(ConversationsPayload {
            conversations: ids.iter().map(|id| ConversationRecord::new(*id)).collect(),
        }),
    )
}

fn incoming_file(count: usize) -> ImportFile {
    ImportFile::new(
        "incoming.json",
        ImportPayload::Incoming(IncomingPayload {
            incoming: (0..count)
                .map(|i| Utterance::new(format!("u{}", i), format!("utterance number {}", i)))
                .collect(),
        }),
    )
}

async fn response_keys(test_db: &TestDatabase, project_id: &str) -> anyhow::Result<Vec<String>> {
    Ok(bot_responses::Entity::find()
        .filter(bot_responses::Column::ProjectId.eq(project_id))
        .order_by_asc(bot_responses::Column::Key)
        .all(test_db.db.as_ref())
        .await?
        .into_iter()
        .map(|r| r.key)
        .collect())
}

#[tokio::test]
async fn test_domain_import_deduplicates_and_indexes() -> anyhow::Result<()> {
    // Arrange
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let batch = vec![domain(
        &[
            ("utter_greet", "Hello there"),
            ("utter_bye", "Goodbye"),
            ("utter_greet", "Hi again"),
        ],
        &[("cuisine", "text")],
    )];

    // Act
    let errors = dispatcher.dispatch(batch, ImportParams::new("p1")).await;

    // Assert
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(response_keys(&test_db, "p1").await?, vec!["utter_bye", "utter_greet"]);

    let greet = bot_responses::Entity::find_by_id(("p1".to_string(), "utter_greet".to_string()))
        .one(test_db.db.as_ref())
        .await?
        .expect("utter_greet should be stored");
    assert_eq!(greet.text_index, "utter_greet\nHello there");

    let slot_count = slots::Entity::find().count(test_db.db.as_ref()).await?;
    assert_eq!(slot_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_reimport_without_wipe_names_existing_keys() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let first = vec![domain(&[("utter_greet", "Hello")], &[])];
    let second = vec![domain(&[("utter_greet", "Hello"), ("utter_bye", "Bye")], &[])];

    assert!(dispatcher.dispatch(first, ImportParams::new("p1")).await.is_empty());
    let errors = dispatcher.dispatch(second, ImportParams::new("p1")).await;

    assert_eq!(
        errors,
        vec!["error when importing responses: utter_greet already exist"]
    );
    // The conflicting batch is rejected as a whole
    assert_eq!(response_keys(&test_db, "p1").await?, vec!["utter_greet"]);
    Ok(())
}

#[tokio::test]
async fn test_wipe_replaces_previous_data() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let first = vec![
        domain(&[("utter_old", "Old")], &[]),
        conversations_file(&["c1", "c2"]),
    ];
    let second = vec![
        domain(&[("utter_new", "New")], &[]),
        conversations_file(&["c1"]),
    ];

    assert!(dispatcher.dispatch(first, ImportParams::new("p1")).await.is_empty());
    let errors = dispatcher
        .dispatch(second, ImportParams::new("p1").wipe(true))
        .await;

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(response_keys(&test_db, "p1").await?, vec!["utter_new"]);
    let stored = conversations::Entity::find()
        .filter(conversations::Column::ProjectId.eq("p1"))
        .count(test_db.db.as_ref())
        .await?;
    assert_eq!(stored, 1);
    Ok(())
}

#[tokio::test]
async fn test_conversation_conflict_does_not_block_other_categories() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    assert!(dispatcher
        .dispatch(vec![conversations_file(&["c1"])], ImportParams::new("p1"))
        .await
        .is_empty());

    let batch = vec![
        conversations_file(&["c1", "c2"]),
        domain(&[("utter_greet", "Hello")], &[]),
        ImportFile::new(
            "endpoints.yml",
            ImportPayload::Endpoints(RawTextPayload {
                raw_text: "action_endpoint:\n  url: http://actions:5055/webhook\n".to_string(),
            }),
        ),
    ];
    let errors = dispatcher.dispatch(batch, ImportParams::new("p1")).await;

    assert_eq!(
        errors,
        vec!["error when importing conversations from conversations.json, it seems that some of the data you are trying to import already exists"]
    );
    assert_eq!(response_keys(&test_db, "p1").await?, vec!["utter_greet"]);
    let settings = SeaOrmSettingsStore::new(test_db.db.clone());
    assert!(settings
        .load("p1", SettingKind::Endpoints, "")
        .await?
        .is_some());
    Ok(())
}

#[tokio::test]
async fn test_rasa_and_project_config_are_saved() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let rasa = |name: &str, language: &str, component: &str| {
        ImportFile::new(
            name,
            ImportPayload::RasaConfig(RasaConfigPayload {
                language: language.to_string(),
                pipeline: serde_yaml::from_str(&format!("- name: {}", component)).unwrap(),
                policies: serde_yaml::from_str("- name: MemoizationPolicy").unwrap(),
            }),
        )
    };
    let bf_config: ProjectConfigPayload = serde_json::from_value(json!({
        "project": { "name": "Restaurant bot" },
        "instance": { "host": "http://rasa:5005" }
    }))?;
    let batch = vec![
        rasa("config-en.yml", "en", "WhitespaceTokenizer"),
        rasa("config-fr.yml", "fr", "SpacyTokenizer"),
        ImportFile::new("bfconfig.yml", ImportPayload::BfConfig(bf_config)),
    ];

    let errors = dispatcher.dispatch(batch, ImportParams::new("p1")).await;

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    let settings = SeaOrmSettingsStore::new(test_db.db.clone());
    assert_eq!(
        settings.load("p1", SettingKind::Pipeline, "fr").await?.as_deref(),
        Some("- name: SpacyTokenizer\n")
    );
    assert_eq!(
        settings.load("p1", SettingKind::Policies, "").await?.as_deref(),
        Some("- name: MemoizationPolicy\n")
    );

    let project = projects::Entity::find_by_id("p1".to_string())
        .one(test_db.db.as_ref())
        .await?
        .expect("project should be stored");
    assert_eq!(project.body["_id"], "p1");
    assert_eq!(project.body["name"], "Restaurant bot");
    assert_eq!(project.body["training"], json!({}));
    Ok(())
}

#[tokio::test]
async fn test_projects_do_not_see_each_other() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let batch = vec![domain(&[("utter_greet", "Hello")], &[("cuisine", "text")])];

    assert!(dispatcher.dispatch(batch.clone(), ImportParams::new("p1")).await.is_empty());
    let errors = dispatcher
        .dispatch(batch, ImportParams::new("p2").wipe(true))
        .await;

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(response_keys(&test_db, "p1").await?, vec!["utter_greet"]);
    assert_eq!(response_keys(&test_db, "p2").await?, vec!["utter_greet"]);
    Ok(())
}

#[tokio::test]
async fn test_large_incoming_file_is_imported() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());

    let errors = dispatcher
        .dispatch(vec![incoming_file(6_000)], ImportParams::new("p1"))
        .await;

    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    let stored = activity::Entity::find()
        .filter(activity::Column::ProjectId.eq("p1"))
        .count(test_db.db.as_ref())
        .await?;
    assert_eq!(stored, 6_000);
    Ok(())
}

#[tokio::test]
async fn test_conflict_in_a_late_chunk_rolls_back_the_file() -> anyhow::Result<()> {
    let test_db = TestDatabase::new().await?;
    let dispatcher = ImportDispatcher::new(&test_db.ports());
    let existing = ImportFile::new(
        "incoming.json",
        ImportPayload::Incoming(IncomingPayload {
            incoming: vec![Utterance::new("u5999", "already here")],
        }),
    );
    assert!(dispatcher
        .dispatch(vec![existing], ImportParams::new("p1"))
        .await
        .is_empty());

    let errors = dispatcher
        .dispatch(vec![incoming_file(6_000)], ImportParams::new("p1"))
        .await;

    assert_eq!(
        errors,
        vec!["error when importing incoming from incoming.json, it seems that some of the data you are trying to import already exists"]
    );
    let stored = activity::Entity::find()
        .count(test_db.db.as_ref())
        .await?;
    assert_eq!(stored, 1);
    Ok(())
}
