//! Scalar binding tests: value, append and replace.

use horizon_bind::{Binder, BinderConfig, Error, MarkupError, Model, NodeId};

fn bound(markup: &str, model: &Model) -> Binder {
    let binder = Binder::from_markup(markup, BinderConfig::default()).expect("markup should parse");
    binder
        .bind_scope(binder.document().root(), model)
        .expect("scan should succeed");
    binder
}

fn node(binder: &Binder, id: &str) -> NodeId {
    binder
        .document()
        .find_by_id(id)
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

fn text(binder: &Binder, id: &str) -> String {
    binder.document().text(node(binder, id)).unwrap()
}

#[test]
fn test_value_and_append_contract() {
    let model = Model::new().with("msg", "a");
    let binder = bound(
        r#"<div><p id="x" bind-value="msg"></p><p id="y" bind-append="msg">prior</p></div>"#,
        &model,
    );
    assert_eq!(text(&binder, "x"), "a");
    assert_eq!(text(&binder, "y"), "priora");

    model.set("msg", "b").unwrap();
    assert_eq!(text(&binder, "x"), "b");
    assert_eq!(text(&binder, "y"), "priorab");
}

#[test]
fn test_every_write_propagates() {
    let model = Model::new();
    let binder = bound(r#"<p id="log" bind-append="line"></p>"#, &model);
    model.set("line", "x").unwrap();
    model.set("line", "x").unwrap();
    assert_eq!(text(&binder, "log"), "xx");
}

#[test]
fn test_rescan_is_idempotent() {
    let model = Model::new().with("msg", "hi");
    let binder = bound(
        r#"<div><p id="x" bind-value="msg"></p><p id="y" bind-append="msg"></p></div>"#,
        &model,
    );
    let records = binder.record_count();

    binder.bind_scope(binder.document().root(), &model).unwrap();
    assert_eq!(binder.record_count(), records);
    assert_eq!(binder.binding_count(&model, "msg"), 2);
    assert_eq!(text(&binder, "y"), "hi");

    model.set("msg", "!").unwrap();
    assert_eq!(text(&binder, "y"), "hi!");
}

#[test]
fn test_initial_sync_reaches_new_record_only() {
    let model = Model::new().with("msg", "a");
    let binder = bound(r#"<div><p id="first" bind-append="msg"></p><p id="second"></p></div>"#, &model);
    assert_eq!(text(&binder, "first"), "a");

    let second = node(&binder, "second");
    binder.document().set_attribute(second, "bind-append", "msg").unwrap();
    binder.bind_element(second, &model).unwrap();

    assert_eq!(text(&binder, "first"), "a");
    assert_eq!(text(&binder, "second"), "a");
}

#[test]
fn test_falsy_initial_value_is_not_rendered() {
    let model = Model::new().with("count", 0).with("label", "");
    let binder = bound(
        r#"<div><p id="count" bind-value="count">placeholder</p><p id="label" bind-value="label">keep</p></div>"#,
        &model,
    );
    assert_eq!(text(&binder, "count"), "placeholder");
    assert_eq!(text(&binder, "label"), "keep");

    model.set("count", 3).unwrap();
    assert_eq!(text(&binder, "count"), "3");
}

#[test]
fn test_editable_controls_use_edit_value() {
    let model = Model::new().with("name", "Ada");
    let binder = bound(
        r#"<form><input id="name" bind-value="name"><textarea id="notes" bind-append="name">x</textarea></form>"#,
        &model,
    );
    let input = node(&binder, "name");
    assert_eq!(binder.document().edit_value(input), "Ada");
    assert_eq!(text(&binder, "notes"), "x");
    assert_eq!(binder.document().edit_value(node(&binder, "notes")), "Ada");

    model.set("name", "Grace").unwrap();
    assert_eq!(binder.document().edit_value(input), "Grace");
    assert_eq!(binder.document().edit_value(node(&binder, "notes")), "AdaGrace");
}

#[test]
fn test_replace_retargets() {
    let model = Model::new();
    let binder = bound(r#"<div id="host"><p bind-replace="content">old</p></div>"#, &model);
    let host = node(&binder, "host");

    model.set("content", "<span>z</span>").unwrap();
    assert_eq!(binder.document().inner_markup(host).unwrap(), "<span>z</span>");

    model.set("content", "  <em>w</em>  <b>ignored</b>").unwrap();
    assert_eq!(binder.document().inner_markup(host).unwrap(), "<em>w</em>");
}

#[test]
fn test_replace_with_node_value() {
    let model = Model::new();
    let binder = bound(r#"<div id="host"><p bind-replace="content"></p></div>"#, &model);
    let hr = binder.document().create_element("hr");

    model.set("content", hr).unwrap();
    assert_eq!(
        binder.document().inner_markup(node(&binder, "host")).unwrap(),
        "<hr/>"
    );
}

#[test]
fn test_replace_with_empty_markup_fails() {
    let model = Model::new();
    let _binder = bound(r#"<p bind-replace="content"></p>"#, &model);
    let result = model.set("content", "   ");
    assert!(matches!(result, Err(Error::Markup(MarkupError::Empty))));
}

#[test]
fn test_unknown_kinds_are_ignored() {
    let model = Model::new().with("x", "shown").with("y", "hidden");
    let binder = bound(r#"<p id="p" bind-bogus="y" bind-value="x"></p>"#, &model);
    assert_eq!(text(&binder, "p"), "shown");
    assert_eq!(binder.binding_count(&model, "y"), 0);
    assert!(!model.is_observed("y"));
}

#[test]
fn test_nested_scopes_are_excluded() {
    let model = Model::new()
        .with("name", "top")
        .with("child", Model::new().with("name", "kid"));
    let binder = bound(
        r#"<div>
            <p id="outer" bind-value="name"></p>
            <section bind-model="child"><p id="inner" bind-value="name"></p></section>
        </div>"#,
        &model,
    );
    assert_eq!(text(&binder, "outer"), "top");
    assert_eq!(text(&binder, "inner"), "kid");

    model.set("name", "changed").unwrap();
    assert_eq!(text(&binder, "outer"), "changed");
    assert_eq!(text(&binder, "inner"), "kid");
    assert_eq!(binder.binding_count(&model, "name"), 1);
}

#[test]
fn test_custom_prefix() {
    let config = BinderConfig::default().with_prefix("data-");
    let binder = Binder::from_markup(
        r#"<div><p id="a" data-value="msg"></p><p id="b" bind-value="msg">untouched</p></div>"#,
        config,
    )
    .unwrap();
    let model = Model::new().with("msg", "hello");
    binder.bind_scope(binder.document().root(), &model).unwrap();

    assert_eq!(text(&binder, "a"), "hello");
    assert_eq!(text(&binder, "b"), "untouched");
}

#[test]
fn test_untrimmed_markup_keeps_leading_text() {
    let config = BinderConfig::default().with_trim_markup(false);
    let binder = Binder::from_markup(r#"<div id="host"><p bind-replace="content"></p></div>"#, config).unwrap();
    let model = Model::new();
    binder.bind_scope(binder.document().root(), &model).unwrap();

    model.set("content", " <b>x</b>").unwrap();
    let host = node(&binder, "host");
    assert_eq!(binder.document().inner_markup(host).unwrap(), " ");
}
