mod common;

use serde_json::json;
use sohl_core::{DocumentRef, LogicError, LogicPhase, SohlBase};
use sohl_runtime::{
    DocumentStore, HostDocument, InMemoryDocumentStore, RuntimeError, SohlActor, SohlItem,
};

#[tokio::test]
async fn actor_cycle_spans_actor_and_items() {
    let store = InMemoryDocumentStore::with_documents([common::hero(), common::mail_shirt()]);
    let mut session = common::session();
    let actor = SohlActor::load(&store, &DocumentRef::actor("A1"), &mut session.context())
        .await
        .unwrap();

    // body: 2 + 4 from the mail shirt next to it
    let body = actor.data().logic();
    assert_eq!(body.effective("protection").unwrap(), 6.0);
    assert_eq!(body.modifier("protection").unwrap().abbrev(), "Armmail +4");

    // sword: 40 + 5 inspired + 10 trained
    let sword = actor.logic("sword").unwrap();
    assert_eq!(sword.effective("mastery").unwrap(), 55.0);
    assert_eq!(sword.phase(), LogicPhase::Finalized);

    let logic_ids: Vec<&str> = actor.logics().map(|(id, _)| id.as_str()).collect();
    assert_eq!(logic_ids, vec!["body", "sword", "mail"]);
    assert_eq!(actor.owner_of("mail").unwrap(), &DocumentRef::item("I1"));
    assert_eq!(
        actor.actions().keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["train", "polish", "clank"]
    );
    assert_eq!(actor.effects().len(), 1);
    assert_eq!(actor.item("I1").unwrap().name(), "Mail Shirt");
}

#[tokio::test]
async fn repeated_cycles_do_not_stack() {
    let store = InMemoryDocumentStore::with_documents([common::hero(), common::mail_shirt()]);
    let mut session = common::session();
    let mut actor = SohlActor::load(&store, &DocumentRef::actor("A1"), &mut session.context())
        .await
        .unwrap();

    actor.prepare(&mut session.context()).unwrap();
    actor.prepare(&mut session.context()).unwrap();

    assert_eq!(actor.data().logic().effective("protection").unwrap(), 6.0);
    assert_eq!(actor.actions().len(), 3);
}

#[tokio::test]
async fn virtual_logic_follows_the_document() {
    let mut hero = common::hero();
    hero.system["species"] = json!("merfolk");
    let store = InMemoryDocumentStore::with_documents([hero]);
    let mut session = common::session();
    let actor = SohlActor::load(&store, &DocumentRef::actor("A1"), &mut session.context())
        .await
        .unwrap();

    let swim = actor.logic("swim").unwrap();
    assert!(swim.is_virtual());
    // 60 + 5 inspired + 10 for the actor's Train action
    assert_eq!(swim.effective("mastery").unwrap(), 75.0);

    let persisted = actor.data().logic().to_json();
    let nested: Vec<&str> = persisted["nestedLogicObjs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|logic| logic["id"].as_str())
        .collect();
    assert_eq!(nested, vec!["sword"]);
}

#[tokio::test]
async fn reads_before_the_cycle_finishes_are_rejected() {
    let mut session = common::session();
    let mut ctx = session.context();
    let mut actor = SohlActor::from_documents(common::hero(), [common::mail_shirt()], &mut ctx)
        .unwrap();

    actor.prepare_base_data(&mut ctx).unwrap();
    let err = actor.data().logic().effective("protection").unwrap_err();
    assert!(matches!(
        err,
        LogicError::PhaseViolation {
            expected: LogicPhase::Finalized,
            actual: LogicPhase::BaseReady,
            ..
        }
    ));

    actor.prepare_derived_data().unwrap();
    assert_eq!(actor.data().logic().effective("protection").unwrap(), 6.0);
}

#[tokio::test]
async fn standalone_item_runs_its_own_cycle() {
    let mut session = common::session();
    let document = HostDocument::new(DocumentRef::item("I9"), "Lesson").with_logic(json!({
        "class": "SkillLogic", "id": "lesson", "name": "Lesson", "type": "skill", "base": 10,
        "nestedActionObjs": [
            {"class": "SohlIntrinsicAction", "id": "drill", "name": "Train", "functionName": "train"}
        ]
    }));
    let mut item = SohlItem::from_document(document, &mut session.context()).unwrap();
    item.prepare(&mut session.context()).unwrap();
    assert_eq!(item.logic().effective("mastery").unwrap(), 20.0);
}

#[tokio::test]
async fn missing_documents_and_logic_are_reported() {
    let mut session = common::session();
    let store = InMemoryDocumentStore::new();
    let err = SohlActor::load(&store, &DocumentRef::actor("A1"), &mut session.context())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Host(_)));

    store
        .create(HostDocument::new(DocumentRef::actor("A1"), "Empty"))
        .await
        .unwrap();
    let err = SohlActor::load(&store, &DocumentRef::actor("A1"), &mut session.context())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::MissingLogic(_)));
}

#[tokio::test]
async fn unknown_classes_fail_the_load() {
    let mut session = common::session();
    let document = HostDocument::new(DocumentRef::actor("A2"), "Ghost")
        .with_logic(json!({"class": "GhostLogic", "name": "Ghost", "type": "body"}));
    let store = InMemoryDocumentStore::with_documents([document]);
    let err = SohlActor::load(&store, &DocumentRef::actor("A2"), &mut session.context())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Registry(_)));
    assert_eq!(session.registry().len(), 8);
}
