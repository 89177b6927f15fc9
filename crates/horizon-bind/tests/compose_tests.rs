//! Nested-model composition tests.

use horizon_bind::{Binder, BinderConfig, Model, NodeId, Value};

fn bound(markup: &str, model: &Model) -> Binder {
    let binder = Binder::from_markup(markup, BinderConfig::default()).unwrap();
    binder.bind_scope(binder.document().root(), model).unwrap();
    binder
}

fn node(binder: &Binder, id: &str) -> NodeId {
    binder.document().find_by_id(id).unwrap()
}

fn text(binder: &Binder, id: &str) -> String {
    binder.document().text(node(binder, id)).unwrap()
}

const CHILD_MARKUP: &str = r#"<section bind-model="child"><p id="a" bind-value="a"></p><p id="b" bind-value="b"></p></section>"#;

#[test]
fn test_assignment_merges_into_retained_child() {
    let child = Model::from_pairs([("a", "1"), ("b", "2")]);
    let model = Model::new().with("child", child.clone());
    let binder = bound(CHILD_MARKUP, &model);
    assert_eq!(text(&binder, "a"), "1");
    assert_eq!(text(&binder, "b"), "2");

    model
        .set("child", Model::from_pairs([("a", "9")]))
        .unwrap();
    assert_eq!(text(&binder, "a"), "9");
    assert_eq!(text(&binder, "b"), "");

    let retained = model.value("child");
    assert!(retained.as_model().is_some_and(|m| m.ptr_eq(&child)));
    assert_eq!(child.value("b"), Value::from(""));

    child.set("b", "live").unwrap();
    assert_eq!(text(&binder, "b"), "live");
}

#[test]
fn test_absent_child_defaults_to_empty_model() {
    let model = Model::new();
    let binder = bound(CHILD_MARKUP, &model);
    assert!(model.value("child").as_model().is_some());
    assert_eq!(text(&binder, "a"), "");

    model
        .set("child", Model::from_pairs([("a", "hi"), ("b", "there")]))
        .unwrap();
    assert_eq!(text(&binder, "a"), "hi");
    assert_eq!(text(&binder, "b"), "there");
}

#[test]
fn test_non_model_write_clears_every_key() {
    let child = Model::from_pairs([("a", "1"), ("b", "2")]);
    let model = Model::new().with("child", child.clone());
    let binder = bound(CHILD_MARKUP, &model);

    model.set("child", 5).unwrap();
    assert_eq!(text(&binder, "a"), "");
    assert_eq!(text(&binder, "b"), "");
    assert!(model.value("child").as_model().is_some_and(|m| m.ptr_eq(&child)));
    assert_eq!(child.keys(), vec!["a", "b"]);
}

#[test]
fn test_deeply_nested_models() {
    let model = Model::new().with(
        "outer",
        Model::new().with("inner", Model::new().with("leaf", "x")),
    );
    let binder = bound(
        r#"<div bind-model="outer"><div bind-model="inner"><span id="leaf" bind-value="leaf"></span></div></div>"#,
        &model,
    );
    assert_eq!(text(&binder, "leaf"), "x");

    model
        .set(
            "outer",
            Model::new().with("inner", Model::new().with("leaf", "y")),
        )
        .unwrap();
    assert_eq!(text(&binder, "leaf"), "y");
}

#[test]
fn test_rescan_registers_one_model_record() {
    let model = Model::new().with("child", Model::from_pairs([("a", "1")]));
    let binder = bound(CHILD_MARKUP, &model);
    binder.bind_scope(binder.document().root(), &model).unwrap();
    assert_eq!(binder.binding_count(&model, "child"), 1);
}

#[test]
fn test_strict_scopes_limit_nested_repeats() {
    let markup = r#"<div bind-model="child"><ul><li id="tpl" bind-repeat="items"></li></ul></div>"#;

    let loose_child = Model::new().with("items", vec![1]);
    let loose_parent = Model::new().with("child", loose_child.clone());
    let loose = bound(markup, &loose_parent);
    assert_eq!(loose.binding_count(&loose_parent, "items"), 1);
    assert_eq!(loose.binding_count(&loose_child, "items"), 1);

    let strict_child = Model::new().with("items", vec![1]);
    let strict_parent = Model::new().with("child", strict_child.clone());
    let strict = Binder::from_markup(markup, BinderConfig::default().with_strict_scopes(true)).unwrap();
    strict
        .bind_scope(strict.document().root(), &strict_parent)
        .unwrap();
    assert_eq!(strict.binding_count(&strict_parent, "items"), 0);
    assert_eq!(strict.binding_count(&strict_child, "items"), 1);
    assert_eq!(strict.repeat_instances(node(&strict, "tpl")).len(), 1);
}
