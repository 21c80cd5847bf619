use pretty_assertions::assert_eq;

use crate::nodes::NodeCode;

use super::*;

#[test]
fn basic() {
    html(
        concat!(
            "My **document**.\n",
            "\n",
            "It's mine.\n",
            "\n",
            "> Yes.\n",
            "\n",
            "## Hi!\n",
            "\n",
            "Okay.\n"
        ),
        concat!(
            "<p>My <strong>document</strong>.</p>\n",
            "<p>It's mine.</p>\n",
            "<blockquote>\n",
            "<p>Yes.</p>\n",
            "</blockquote>\n",
            "<h2>Hi!</h2>\n",
            "<p>Okay.</p>\n"
        ),
    );
}

#[test]
fn codefence() {
    html(
        concat!("``` rust yum\n", "fn main<'a>();\n", "```\n"),
        concat!(
            "<pre><code class=\"language-rust\">fn main&lt;'a&gt;();\n",
            "</code></pre>\n"
        ),
    );
}

#[test]
fn codefence_unclosed_runs_to_end() {
    html(
        concat!("> ~~~\n", "> a\n", "\n", "b\n"),
        concat!(
            "<blockquote>\n",
            "<pre><code>a\n",
            "</code></pre>\n",
            "</blockquote>\n",
            "<p>b</p>\n"
        ),
    );
    html("```\nx\n\n", "<pre><code>x\n\n</code></pre>\n");
}

#[test]
fn codefence_needs_longer_closer() {
    html(
        concat!("````\n", "```\n", "````\n"),
        "<pre><code>```\n</code></pre>\n",
    );
    html(
        concat!("```\n", "aaa\n", "~~~\n", "```\n"),
        "<pre><code>aaa\n~~~\n</code></pre>\n",
    );
}

#[test]
fn codefence_info_with_backtick_is_not_a_fence() {
    html("``` aa ```\nfoo", "<p><code>aa</code>\nfoo</p>\n");
}

#[test]
fn indented_code() {
    html(
        concat!("    a simple\n", "      indented code block\n"),
        concat!(
            "<pre><code>a simple\n",
            "  indented code block\n",
            "</code></pre>\n"
        ),
    );
    html(
        concat!("    chunk1\n", "\n", "    chunk2\n", "  \n", " \n", " \n", "    chunk3\n"),
        concat!(
            "<pre><code>chunk1\n",
            "\n",
            "chunk2\n",
            "\n",
            "\n",
            "\n",
            "chunk3\n",
            "</code></pre>\n"
        ),
    );
    html(
        concat!("Foo\n", "    bar\n"),
        concat!("<p>Foo\n", "bar</p>\n"),
    );
}

#[test]
fn lists() {
    html(
        concat!("2. Hello.\n", "3. Hi.\n"),
        concat!(
            "<ol start=\"2\">\n",
            "<li>Hello.</li>\n",
            "<li>Hi.</li>\n",
            "</ol>\n"
        ),
    );

    html(
        concat!("- Hello.\n", "- Hi.\n"),
        concat!("<ul>\n", "<li>Hello.</li>\n", "<li>Hi.</li>\n", "</ul>\n"),
    );
}

#[test]
fn lists_change_on_marker() {
    html(
        concat!("- foo\n", "- bar\n", "+ baz\n"),
        concat!(
            "<ul>\n",
            "<li>foo</li>\n",
            "<li>bar</li>\n",
            "</ul>\n",
            "<ul>\n",
            "<li>baz</li>\n",
            "</ul>\n"
        ),
    );
    html(
        concat!("1. foo\n", "2. bar\n", "3) baz\n"),
        concat!(
            "<ol>\n",
            "<li>foo</li>\n",
            "<li>bar</li>\n",
            "</ol>\n",
            "<ol start=\"3\">\n",
            "<li>baz</li>\n",
            "</ol>\n"
        ),
    );
}

#[test]
fn empty_list_item_cannot_interrupt_paragraph() {
    html("foo\n*\n\nfoo\n1.\n", "<p>foo\n*</p>\n<p>foo\n1.</p>\n");
}

#[test]
fn thematic_breaks() {
    html(
        concat!("---\n", "\n", "- - -\n", "\n", "\n", "_        _   _\n"),
        concat!("<hr />\n", "<hr />\n", "<hr />\n"),
    );
    html(
        concat!("- foo\n", "***\n", "- bar\n"),
        concat!(
            "<ul>\n",
            "<li>foo</li>\n",
            "</ul>\n",
            "<hr />\n",
            "<ul>\n",
            "<li>bar</li>\n",
            "</ul>\n"
        ),
    );
    html("+++\n", "<p>+++</p>\n");
}

#[test]
fn setext_heading() {
    html(
        concat!("Hi\n", "==\n", "\n", "Ok\n", "-----\n"),
        concat!("<h1>Hi</h1>\n", "<h2>Ok</h2>\n"),
    );
    html(
        concat!("Foo *bar\n", "baz*\n", "====\n"),
        "<h1>Foo <em>bar\nbaz</em></h1>\n",
    );
    html("Foo\n---\nbar\n", "<h2>Foo</h2>\n<p>bar</p>\n");
}

#[test]
fn atx_headings() {
    html(
        concat!(
            "# foo\n",
            "## foo ##\n",
            "###   foo   ###   \n",
            "#### foo ### b\n",
            "##### foo#\n",
            "####### foo\n",
            "#5 bolt\n"
        ),
        concat!(
            "<h1>foo</h1>\n",
            "<h2>foo</h2>\n",
            "<h3>foo</h3>\n",
            "<h4>foo ### b</h4>\n",
            "<h5>foo#</h5>\n",
            "<p>####### foo\n",
            "#5 bolt</p>\n"
        ),
    );
    html("## \n#\n### ###\n", "<h2></h2>\n<h1></h1>\n<h3></h3>\n");
}

#[test]
fn html_block_1() {
    html(
        concat!(
            "<script\n",
            "*ok* </script> *ok*\n",
            "\n",
            "*ok*\n",
            "\n",
            "*ok*\n",
            "\n",
            "<pre x>\n",
            "*ok*\n",
            "</style>\n",
            "*ok*\n",
            "<style>\n",
            "*ok*\n",
            "</style>\n",
            "\n",
            "*ok*\n"
        ),
        concat!(
            "<script\n",
            "*ok* </script> *ok*\n",
            "<p><em>ok</em></p>\n",
            "<p><em>ok</em></p>\n",
            "<pre x>\n",
            "*ok*\n",
            "</style>\n",
            "<p><em>ok</em></p>\n",
            "<style>\n",
            "*ok*\n",
            "</style>\n",
            "<p><em>ok</em></p>\n"
        ),
    );
}

#[test]
fn html_block_2() {
    html(
        concat!("   <!-- abc\n", "\n", "ok --> *hi*\n", "*hi*\n"),
        concat!(
            "   <!-- abc\n",
            "\n",
            "ok --> *hi*\n",
            "<p><em>hi</em></p>\n"
        ),
    );
}

#[test]
fn html_block_3() {
    html(
        concat!(" <? o\n", "k ?> *a*\n", "*a*\n"),
        concat!(" <? o\n", "k ?> *a*\n", "<p><em>a</em></p>\n"),
    );
}

#[test]
fn html_block_4() {
    html(
        concat!("<!X >\n", "ok\n", "<!X\n", "um > h\n", "ok\n"),
        concat!(
            "<!X >\n",
            "<p>ok</p>\n",
            "<!X\n",
            "um > h\n",
            "<p>ok</p>\n"
        ),
    );
}

#[test]
fn html_block_5() {
    html(
        concat!(
            "<![CDATA[\n",
            "\n",
            "hm >\n",
            "*ok*\n",
            "]]> *ok*\n",
            "*ok*\n"
        ),
        concat!(
            "<![CDATA[\n",
            "\n",
            "hm >\n",
            "*ok*\n",
            "]]> *ok*\n",
            "<p><em>ok</em></p>\n"
        ),
    );
}

#[test]
fn html_block_6() {
    html(
        concat!(" </table>\n", "*x*\n", "\n", "ok\n", "\n", "<li\n", "*x*\n"),
        concat!(" </table>\n", "*x*\n", "<p>ok</p>\n", "<li\n", "*x*\n"),
    );
}

#[test]
fn html_block_7() {
    html(
        concat!("<a b c=x d='y' z=\"f\" >\n", "ok\n", "\n", "ok\n"),
        concat!("<a b c=x d='y' z=\"f\" >\n", "ok\n", "<p>ok</p>\n"),
    );
    // Type 7 cannot interrupt a paragraph.
    html(
        concat!("Foo\n", "<a href=\"bar\">\n", "baz\n"),
        concat!("<p>Foo\n", "<a href=\"bar\">\n", "baz</p>\n"),
    );
}

#[test]
fn backticks() {
    html(
        "Some `code\\` yep.\n",
        "<p>Some <code>code\\</code> yep.</p>\n",
    );
}

#[test]
fn backticks_empty_with_newline_should_be_space() {
    html("`\n`", "<p><code> </code></p>\n");
}

#[test]
fn blockquote_hard_linebreak_space() {
    html(">\\\n A", "<blockquote>\n<p><br />\nA</p>\n</blockquote>\n");
}

#[test]
fn blockquote_hard_linebreak_nonlazy_space() {
    html(
        "> A\\\n> B",
        "<blockquote>\n<p>A<br />\nB</p>\n</blockquote>\n",
    );
}

#[test]
fn hard_breaks() {
    html("foo  \nbar", "<p>foo<br />\nbar</p>\n");
    html("foo       \n     bar", "<p>foo<br />\nbar</p>\n");
    html("foo  ", "<p>foo</p>\n");
    html("### foo\\", "<h3>foo\\</h3>\n");
    html("foo \nbaz", "<p>foo\nbaz</p>\n");
}

#[test]
fn backticks_num() {
    let input = "Some `code1`. More ``` code2 ```.\n";

    let arena = Arena::new();
    let options = Options::default();
    let root = parse_document(&arena, input, &options);
    let paragraph = root.first_child().unwrap();

    let codes: Vec<NodeValue> = paragraph
        .children()
        .map(|node| node.data.borrow().value.clone())
        .filter(|value| matches!(value, NodeValue::Code(..)))
        .collect();

    assert_eq!(
        codes,
        vec![
            NodeValue::Code(NodeCode {
                num_backticks: 1,
                literal: "code1".to_string(),
            }),
            NodeValue::Code(NodeCode {
                num_backticks: 3,
                literal: "code2".to_string(),
            }),
        ]
    );
}

#[test]
fn backslashes() {
    html(
        concat!(
            "Some \\`fake code\\`.\n",
            "\n",
            "Some fake linebreaks:\\\n",
            "Yes.\\\n",
            "See?\n",
            "\n",
            "Ga\\rbage.\n"
        ),
        concat!(
            "<p>Some `fake code`.</p>\n",
            "<p>Some fake linebreaks:<br />\n",
            "Yes.<br />\n",
            "See?</p>\n",
            "<p>Ga\\rbage.</p>\n"
        ),
    );
}

#[test]
fn entities() {
    html(
        concat!(
            "This is &amp;, &copy;, &trade;, \\&trade;, &xyz;, &NotEqualTilde;.\n",
            "\n",
            "&#8734; &#x221e;\n"
        ),
        concat!(
            "<p>This is &amp;, ©, ™, &amp;trade;, &amp;xyz;, \u{2242}\u{338}.</p>\n",
            "<p>∞ ∞</p>\n"
        ),
    );
}

#[test]
fn entities_in_code_stay_literal() {
    html("`f&ouml;&ouml;`", "<p><code>f&amp;ouml;&amp;ouml;</code></p>\n");
    html(
        "```\nf&ouml;f&ouml;\n```",
        "<pre><code>f&amp;ouml;f&amp;ouml;\n</code></pre>\n",
    );
}

#[test]
fn images() {
    html(
        concat!("I am ![eating [things](/url)](http://i.imgur.com/QqK1vq7.png).\n"),
        concat!(
            "<p>I am <img src=\"http://i.imgur.com/QqK1vq7.png\" alt=\"eating things\" \
             />.</p>\n"
        ),
    );
    html(
        "![foo *bar*](train.jpg \"train & tracks\")",
        "<p><img src=\"train.jpg\" alt=\"foo bar\" title=\"train &amp; tracks\" /></p>\n",
    );
}

#[test]
fn crlf_line_endings() {
    html(
        "# a\r\nb\r\nc\r\n\r\n- d\r\n",
        "<h1>a</h1>\n<p>b\nc</p>\n<ul>\n<li>d</li>\n</ul>\n",
    );
}

#[test]
fn nul_is_replaced() {
    html("a\0b", "<p>a\u{fffd}b</p>\n");
    html("&#0;", "<p>\u{fffd}</p>\n");
}
