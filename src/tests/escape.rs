use super::*;

#[test]
fn raw_html_passes_through() {
    html(
        "<div>\n*hi*\n</div>\n\nan <em>inline</em> tag",
        "<div>\n*hi*\n</div>\n<p>an <em>inline</em> tag</p>\n",
    );
}

#[test]
fn escape_block_html() {
    html_opts!(
        [render.escape],
        "<div>\n*hi*\n</div>\n",
        "&lt;div&gt;\n*hi*\n&lt;/div&gt;\n",
    );
}

#[test]
fn escape_inline_html() {
    html_opts!(
        [render.escape],
        "an <em>inline</em> <!-- comment --> tag",
        "<p>an &lt;em&gt;inline&lt;/em&gt; &lt;!-- comment --&gt; tag</p>\n",
    );
}

#[test]
fn escape_leaves_markdown_alone() {
    html_opts!(
        [render.escape],
        "*a* [b](/c) <https://d.e>",
        "<p><em>a</em> <a href=\"/c\">b</a> <a href=\"https://d.e\">https://d.e</a></p>\n",
    );
}

#[test]
fn text_is_always_escaped() {
    html(
        "a < b > c & \"d\" 'e'",
        "<p>a &lt; b &gt; c &amp; &quot;d&quot; 'e'</p>\n",
    );
}

#[test]
fn attributes_are_escaped() {
    html(
        "[x](/a?b=1&c=2 \"<q> & 'r'\")",
        "<p><a href=\"/a?b=1&amp;c=2\" title=\"&lt;q&gt; &amp; 'r'\">x</a></p>\n",
    );
    html(
        "[x](\"><script>)",
        "<p><a href=\"%22%3E%3Cscript%3E\">x</a></p>\n",
    );
    html(
        "```\"><script>\nx\n```",
        "<pre><code class=\"language-&quot;&gt;&lt;script&gt;\">x\n</code></pre>\n",
    );
}
