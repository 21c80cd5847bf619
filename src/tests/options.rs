use super::*;

#[test]
fn hardbreaks() {
    html_opts!(
        [render.hardbreaks],
        concat!("foo\n", "bar  \n", "baz\n"),
        "<p>foo<br />\nbar<br />\nbaz</p>\n",
    );
}

#[test]
fn github_pre_lang() {
    html_opts!(
        [render.github_pre_lang],
        concat!("``` rust yum\n", "fn main<'a>();\n", "```\n"),
        concat!(
            "<pre lang=\"rust\"><code>fn main&lt;'a&gt;();\n",
            "</code></pre>\n"
        ),
    );
}

#[test]
fn default_info_string() {
    let mut options = Options::default();
    options.parse.default_info_string = Some("rust".to_string());

    html_opts_w(
        "```\nfn main();\n```\n",
        "<pre><code class=\"language-rust\">fn main();\n</code></pre>\n",
        &options,
    );

    // Only fenced blocks without an info string are affected.
    html_opts_w(
        "```ruby\nputs\n```\n\n    indented\n",
        concat!(
            "<pre><code class=\"language-ruby\">puts\n</code></pre>\n",
            "<pre><code>indented\n</code></pre>\n"
        ),
        &options,
    );
}

#[test]
fn info_string_is_unescaped() {
    html(
        "``` f&ouml;\\*o bar\nx\n```",
        "<pre><code class=\"language-fö*o\">x\n</code></pre>\n",
    );
}

#[test]
fn extensions_are_off_by_default() {
    html(
        concat!("| a |\n", "|---|\n", "~~b~~ - [ ] c\n"),
        "<p>| a |\n|---|\n~~b~~ - [ ] c</p>\n",
    );
}

#[test]
fn gfm_enables_every_extension() {
    let options = Options::gfm();
    assert!(options.extension.table);
    assert!(options.extension.strikethrough);
    assert!(options.extension.tasklist);
    assert!(options.extension.tagfilter);

    html_opts_w(
        "- [x] ~~done~~ <xmp>",
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> <del>done</del> &lt;xmp></li>\n",
            "</ul>\n"
        ),
        &options,
    );
}
