//! WASM browser tests for quire-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use quire_editor_browser::{
    BeforeInputContext, BeforeInputResult, DomRenderer, Editor, EditorConfig, InputType,
    KEY_ATTRIBUTE, Point, Range, handle_beforeinput, range_render, selection_to_range,
};

fn make_editor(html: &str) -> Editor {
    Editor::with_html(EditorConfig::default(), html).unwrap()
}

fn caret_at_end(editor: &mut Editor) {
    let last = *editor.tree().stack().last().unwrap();
    let end = Point::end_of(editor.tree(), last).unwrap();
    editor.set_range(Range::collapsed(end)).unwrap();
}

fn ctx(input_type: InputType, data: Option<&str>) -> BeforeInputContext {
    BeforeInputContext {
        input_type,
        data: data.map(str::to_string),
        target_range: None,
        is_composing: false,
    }
}

fn mount() -> web_sys::Element {
    let document = gloo_utils::document();
    let root = document.create_element("div").unwrap();
    root.set_attribute("contenteditable", "true").unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

// === InputType parsing tests ===

#[wasm_bindgen_test]
fn test_parse_insert_text() {
    assert_eq!(InputType::parse("insertText"), InputType::InsertText);
}

#[wasm_bindgen_test]
fn test_parse_unknown() {
    match InputType::parse("insertOrderedList") {
        InputType::Unknown(s) => assert_eq!(s, "insertOrderedList"),
        _ => panic!("Expected Unknown variant"),
    }
}

// === BeforeInput handler tests ===

#[wasm_bindgen_test]
fn test_handle_insert_text() {
    let mut editor = make_editor("<p>hello</p>");
    caret_at_end(&mut editor);

    let result = handle_beforeinput(&mut editor, &ctx(InputType::InsertText, Some("!")));

    assert_eq!(result, BeforeInputResult::Handled);
    assert_eq!(editor.html(), "<p>hello!</p>");
}

#[wasm_bindgen_test]
fn test_handle_delete_backward() {
    let mut editor = make_editor("<p>hello</p>");
    caret_at_end(&mut editor);

    let result = handle_beforeinput(&mut editor, &ctx(InputType::DeleteContentBackward, None));

    assert_eq!(result, BeforeInputResult::Handled);
    assert_eq!(editor.html(), "<p>hell</p>");
}

#[wasm_bindgen_test]
fn test_handle_composition_passthrough() {
    let mut editor = make_editor("<p>hello</p>");
    caret_at_end(&mut editor);
    let mut composing = ctx(InputType::InsertText, Some("x"));
    composing.is_composing = true;

    let result = handle_beforeinput(&mut editor, &composing);

    assert_eq!(result, BeforeInputResult::PassThrough);
    assert_eq!(editor.html(), "<p>hello</p>");
}

#[wasm_bindgen_test]
fn test_handle_undo_redo() {
    let mut editor = make_editor("<p>hello</p>");
    caret_at_end(&mut editor);

    handle_beforeinput(&mut editor, &ctx(InputType::InsertParagraph, None));
    assert_eq!(editor.html(), "<p>hello</p><p><br></p>");

    let result = handle_beforeinput(&mut editor, &ctx(InputType::HistoryUndo, None));
    assert_eq!(result, BeforeInputResult::Handled);
    assert_eq!(editor.html(), "<p>hello</p>");

    handle_beforeinput(&mut editor, &ctx(InputType::HistoryRedo, None));
    assert_eq!(editor.html(), "<p>hello</p><p><br></p>");
}

#[wasm_bindgen_test]
fn test_handle_target_range_replaces_selection() {
    let mut editor = make_editor("<p>hello</p>");
    let text = editor.tree().caret_leaves(editor.tree().stack()[0])[0];
    let mut replace = ctx(InputType::InsertText, Some("j"));
    replace.target_range = Some(Range::new(
        Point::new(editor.tree(), text, 0).unwrap(),
        Point::new(editor.tree(), text, 1).unwrap(),
    ));

    handle_beforeinput(&mut editor, &replace);

    assert_eq!(editor.html(), "<p>jello</p>");
}

// === Rendering tests ===

#[wasm_bindgen_test]
fn test_render_into_root() {
    let mut editor = make_editor("<p>a<b>b</b></p><p><br></p>");
    let root = mount();
    let mut renderer = DomRenderer::new(root.clone());

    renderer.render(editor.tree_mut()).unwrap();

    assert_eq!(root.child_element_count(), 2);
    let first = root.first_element_child().unwrap();
    assert_eq!(first.local_name(), "p");
    assert!(first.has_attribute(KEY_ATTRIBUTE));
    assert_eq!(first.text_content().unwrap(), "ab");
    let styled = first.first_element_child().unwrap();
    assert_eq!(styled.local_name(), "span");
    assert_eq!(
        styled.get_attribute("style").unwrap(),
        "font-weight: bold;"
    );
    let second = root.last_element_child().unwrap();
    assert_eq!(second.first_element_child().unwrap().local_name(), "br");
}

#[wasm_bindgen_test]
fn test_render_reuses_nodes() {
    let mut editor = make_editor("<p>one</p><p>two</p>");
    let root = mount();
    let mut renderer = DomRenderer::new(root.clone());
    renderer.render(editor.tree_mut()).unwrap();
    let before = root.first_element_child().unwrap();

    caret_at_end(&mut editor);
    editor.insert_text("!").unwrap();
    renderer.render(editor.tree_mut()).unwrap();

    let after = root.first_element_child().unwrap();
    assert!(before.is_same_node(Some(&after)));
    assert_eq!(root.text_content().unwrap(), "onetwo!");
}

#[wasm_bindgen_test]
fn test_render_drops_removed_blocks() {
    let mut editor = make_editor("<p>ab</p><p>cd</p>");
    let root = mount();
    let mut renderer = DomRenderer::new(root.clone());
    renderer.render(editor.tree_mut()).unwrap();

    editor.select_all().unwrap();
    editor.delete().unwrap();
    renderer.render(editor.tree_mut()).unwrap();

    assert_eq!(root.child_element_count(), 1);
    assert_eq!(root.text_content().unwrap(), "");
}

// === Selection tests ===

#[wasm_bindgen_test]
fn test_selection_round_trip() {
    let mut editor = make_editor("<p>héllo</p><p>world</p>");
    let root = mount();
    let mut renderer = DomRenderer::new(root);
    renderer.render(editor.tree_mut()).unwrap();

    let tree = editor.tree();
    let first = tree.caret_leaves(tree.stack()[0])[0];
    let second = tree.caret_leaves(tree.stack()[1])[0];
    let range = Range::new(
        Point::new(tree, first, 2).unwrap(),
        Point::new(tree, second, 3).unwrap(),
    );
    range_render(&renderer, tree, Some(&range)).unwrap();

    let selection = gloo_utils::window().get_selection().unwrap().unwrap();
    assert_eq!(selection_to_range(&renderer, tree, &selection), Some(range));
}

#[wasm_bindgen_test]
fn test_selection_outside_root_is_ignored() {
    let mut editor = make_editor("<p>inside</p>");
    let root = mount();
    let mut renderer = DomRenderer::new(root);
    renderer.render(editor.tree_mut()).unwrap();

    let document = gloo_utils::document();
    let outside = document.create_element("div").unwrap();
    outside.set_text_content(Some("outside"));
    document.body().unwrap().append_child(&outside).unwrap();
    let text = outside.first_child().unwrap();
    let selection = gloo_utils::window().get_selection().unwrap().unwrap();
    selection.set_base_and_extent(&text, 0, &text, 3).unwrap();

    assert_eq!(selection_to_range(&renderer, editor.tree(), &selection), None);
}
