use pretty_assertions::assert_eq;

use super::*;

#[test]
fn tasklist() {
    html_opts!(
        [extension.tasklist],
        concat!(
            "* [ ] Red\n",
            "* [x] Green\n",
            "* [X] Blue\n",
            "* [!] Papayawhip\n",
            "<!-- end list -->\n",
            "1. [ ] Bird\n",
            "2. [ ] McHale\n",
            "3. [x] Parish\n",
            "<!-- end list -->\n",
            "* [ ] Red\n",
            "  * [x] Green\n",
            "    * [ ] Blue\n"
        ),
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> Red</li>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Green</li>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Blue</li>\n",
            "<li>[!] Papayawhip</li>\n",
            "</ul>\n",
            "<!-- end list -->\n",
            "<ol>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> Bird</li>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> McHale</li>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Parish</li>\n",
            "</ol>\n",
            "<!-- end list -->\n",
            "<ul>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> Red\n",
            "<ul>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Green\n",
            "<ul>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> Blue</li>\n",
            "</ul>\n",
            "</li>\n",
            "</ul>\n",
            "</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn tasklist_needs_text_after_marker() {
    html_opts!(
        [extension.tasklist],
        "- [ ]\n- [x]foo\n",
        concat!("<ul>\n", "<li>[ ]</li>\n", "<li>[x]foo</li>\n", "</ul>\n"),
    );
}

#[test]
fn tasklist_only_in_list_items() {
    html_opts!(
        [extension.tasklist],
        "[ ] not a task\n",
        "<p>[ ] not a task</p>\n",
    );
}

#[test]
fn tasklist_tree() {
    let arena = Arena::new();
    let mut options = Options::default();
    options.extension.tasklist = true;
    let root = parse_document(&arena, "- [x] done\n- [ ] todo\n", &options);

    let items: Vec<NodeValue> = collect_values(root)
        .into_iter()
        .filter(|value| matches!(value, NodeValue::TaskItem(..)))
        .collect();
    assert_eq!(
        items,
        vec![NodeValue::TaskItem(Some('x')), NodeValue::TaskItem(None)]
    );
}

#[test]
fn tasklist_disabled() {
    html(
        "- [ ] Red\n",
        concat!("<ul>\n", "<li>[ ] Red</li>\n", "</ul>\n"),
    );
}
