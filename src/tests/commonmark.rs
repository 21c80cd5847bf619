use super::*;

#[test]
fn heading() {
    html("# Heading", "<h1>Heading</h1>\n");
}

#[test]
fn nested_emphasis() {
    html(
        "*a **b** c*",
        "<p><em>a <strong>b</strong> c</em></p>\n",
    );
    html("***a***", "<p><em><strong>a</strong></em></p>\n");
    html("*a*b*c*", "<p><em>a</em>b<em>c</em></p>\n");
}

#[test]
fn reference_with_title() {
    html(
        "[x]\n\n[x]: /url \"t\"",
        "<p><a href=\"/url\" title=\"t\">x</a></p>\n",
    );
}

#[test]
fn script_outside_raw_html() {
    html("`<script>`", "<p><code>&lt;script&gt;</code></p>\n");
    html_opts!(
        [render.escape],
        "<script>alert(1)</script>",
        "&lt;script&gt;alert(1)&lt;/script&gt;\n",
    );
}

#[test]
fn rule_of_three() {
    html("*foo**bar**baz*", "<p><em>foo<strong>bar</strong>baz</em></p>\n");
    html("*foo**bar*", "<p><em>foo**bar</em></p>\n");
    html("foo***bar***baz", "<p>foo<em><strong>bar</strong></em>baz</p>\n");
    html("**foo*bar*baz**", "<p><strong>foo<em>bar</em>baz</strong></p>\n");
}

#[test]
fn flanking() {
    html("a * foo bar*", "<p>a * foo bar*</p>\n");
    html("foo*bar*", "<p>foo<em>bar</em></p>\n");
    html("foo_bar_", "<p>foo_bar_</p>\n");
    html("*(*foo*)*", "<p><em>(<em>foo</em>)</em></p>\n");
    html("_foo_bar_baz_", "<p><em>foo_bar_baz</em></p>\n");
    html("**foo \"*bar*\" foo**", "<p><strong>foo &quot;<em>bar</em>&quot; foo</strong></p>\n");
}

#[test]
fn links_bind_tighter_than_emphasis() {
    html("*[foo*](/u)", "<p>*<a href=\"/u\">foo*</a></p>\n");
    html("[foo *bar](/u)*", "<p><a href=\"/u\">foo *bar</a>*</p>\n");
}

#[test]
fn code_spans_bind_tighter_than_emphasis() {
    html("*a `*`*", "<p><em>a <code>*</code></em></p>\n");
    html("`` foo ` bar ``", "<p><code>foo ` bar</code></p>\n");
    html("` `` `", "<p><code>``</code></p>\n");
    html("`foo\nbar  \nbaz`", "<p><code>foo bar   baz</code></p>\n");
    html("```foo``", "<p>```foo``</p>\n");
}

#[test]
fn no_links_in_links() {
    html(
        "[foo [bar](/uri)](/uri)",
        "<p>[foo <a href=\"/uri\">bar</a>](/uri)</p>\n",
    );
    html(
        "![[[foo](uri1)](uri2)](uri3)",
        "<p><img src=\"uri3\" alt=\"[foo](uri2)\" /></p>\n",
    );
}

#[test]
fn lazy_continuation() {
    html(
        "> bar\nbaz\n> foo",
        "<blockquote>\n<p>bar\nbaz\nfoo</p>\n</blockquote>\n",
    );
    html(
        "> foo\n---",
        "<blockquote>\n<p>foo</p>\n</blockquote>\n<hr />\n",
    );
}

#[test]
fn list_items_and_indentation() {
    html(
        "1.  A paragraph\n    with two lines.\n\n        indented code\n\n    > A block quote.",
        concat!(
            "<ol>\n",
            "<li>\n",
            "<p>A paragraph\n",
            "with two lines.</p>\n",
            "<pre><code>indented code\n",
            "</code></pre>\n",
            "<blockquote>\n",
            "<p>A block quote.</p>\n",
            "</blockquote>\n",
            "</li>\n",
            "</ol>\n"
        ),
    );
    html(
        "- foo\n  - bar\n    - baz\n",
        concat!(
            "<ul>\n",
            "<li>foo\n",
            "<ul>\n",
            "<li>bar\n",
            "<ul>\n",
            "<li>baz</li>\n",
            "</ul>\n",
            "</li>\n",
            "</ul>\n",
            "</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn loose_and_tight_lists() {
    html(
        "- a\n- b\n\n- c\n",
        concat!(
            "<ul>\n",
            "<li>\n<p>a</p>\n</li>\n",
            "<li>\n<p>b</p>\n</li>\n",
            "<li>\n<p>c</p>\n</li>\n",
            "</ul>\n"
        ),
    );
    html(
        "- a\n  - b\n\n    c\n- d\n",
        concat!(
            "<ul>\n",
            "<li>a\n",
            "<ul>\n",
            "<li>\n<p>b</p>\n<p>c</p>\n</li>\n",
            "</ul>\n",
            "</li>\n",
            "<li>d</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn ordered_list_interrupting_paragraph() {
    html(
        "The number of windows in my house is\n14.  The number of doors is 6.",
        "<p>The number of windows in my house is\n14.  The number of doors is 6.</p>\n",
    );
    html(
        "The number of windows in my house is\n1.  The number of doors is 6.",
        concat!(
            "<p>The number of windows in my house is</p>\n",
            "<ol>\n",
            "<li>The number of doors is 6.</li>\n",
            "</ol>\n"
        ),
    );
}

#[test]
fn tabs() {
    html("\tfoo\tbaz\t\tbim", "<pre><code>foo\tbaz\t\tbim\n</code></pre>\n");
    html(
        "  - foo\n\n\tbar",
        "<ul>\n<li>\n<p>foo</p>\n<p>bar</p>\n</li>\n</ul>\n",
    );
    html(">\t\tfoo", "<blockquote>\n<pre><code>  foo\n</code></pre>\n</blockquote>\n");
}

#[test]
fn entities() {
    html(
        "&nbsp; &amp; &copy; &AElig; &Dcaron;",
        "<p>\u{a0} &amp; © Æ Ď</p>\n",
    );
    html("&#35; &#1234; &#992; &#0;", "<p># Ӓ Ϡ \u{fffd}</p>\n");
    html("&#X22; &#XD06; &#xcab;", "<p>&quot; ആ ಫ</p>\n");
    html("&nbsp &x; &#; &#x;", "<p>&amp;nbsp &amp;x; &amp;#; &amp;#x;</p>\n");
    html(
        "[foo](/f&ouml;&ouml; \"f&ouml;&ouml;\")",
        "<p><a href=\"/f%C3%B6%C3%B6\" title=\"föö\">foo</a></p>\n",
    );
}

#[test]
fn backslash_escapes() {
    html(
        "\\*not emphasized*\n\\<br/> not a tag\n\\[not a link](/foo)",
        "<p>*not emphasized*\n&lt;br/&gt; not a tag\n[not a link](/foo)</p>\n",
    );
    html("\\\\*emphasis*", "<p>\\<em>emphasis</em></p>\n");
    html("foo\\\nbar", "<p>foo<br />\nbar</p>\n");
    html("\\→\\A\\a\\ \\3\\φ\\«", "<p>\\→\\A\\a\\ \\3\\φ\\«</p>\n");
}

#[test]
fn autolinks() {
    html(
        "<http://foo.bar.baz/test?q=hello&id=22&boolean>",
        "<p><a href=\"http://foo.bar.baz/test?q=hello&amp;id=22&amp;boolean\">http://foo.bar.baz/test?q=hello&amp;id=22&amp;boolean</a></p>\n",
    );
    html(
        "<foo@bar.example.com>",
        "<p><a href=\"mailto:foo@bar.example.com\">foo@bar.example.com</a></p>\n",
    );
    html("<http://foo.bar/baz bim>", "<p>&lt;http://foo.bar/baz bim&gt;</p>\n");
    html(
        "<https://foo.bar/baz\\bim>",
        "<p><a href=\"https://foo.bar/baz%5Cbim\">https://foo.bar/baz\\bim</a></p>\n",
    );
}

#[test]
fn raw_html() {
    html("<a><bab><c2c>", "<p><a><bab><c2c></p>\n");
    html("<a  /><b2\ndata=\"foo\" >", "<p><a  /><b2\ndata=\"foo\" ></p>\n");
    html("foo <!-- this is a --\ncomment - with hyphens -->", "<p>foo <!-- this is a --\ncomment - with hyphens --></p>\n");
    html("<a h*#ref=\"hi\">", "<p>&lt;a h*#ref=&quot;hi&quot;&gt;</p>\n");
    html(
        "<table><tr><td>\n<pre>\n**Hello**,\n\n_world_.\n</pre>\n</td></tr></table>",
        concat!(
            "<table><tr><td>\n",
            "<pre>\n",
            "**Hello**,\n",
            "<p><em>world</em>.\n",
            "</pre></p>\n",
            "</td></tr></table>\n"
        ),
    );
}
