use super::*;
use ntest::timeout;

// input: python3 -c 'n = 50000; print("*a_ " * n)'
#[test]
#[timeout(4000)]
fn pathological_emphases() {
    let n = 50_000;
    let input = "*a_ ".repeat(n);
    let mut exp = format!("<p>{}", input);
    // Right-most space is trimmed in output.
    exp.pop();
    exp += "</p>\n";

    html(&input, &exp);
}

#[test]
#[timeout(4000)]
fn pathological_unclosed_openers() {
    let n = 50_000;
    let input = "**a ".repeat(n);
    let mut exp = format!("<p>{}", input);
    exp.pop();
    exp += "</p>\n";

    html(&input, &exp);
}

#[test]
#[timeout(4000)]
fn pathological_strikethrough() {
    let n = 50_000;
    let input = "~a ~~b ".repeat(n);
    markdown_to_html(&input, &Options::gfm());
}

// input: python3 -c 'n = 50000; print("[" * n + "a" + "]" * n)'
#[test]
#[timeout(4000)]
fn pathological_brackets() {
    let n = 50_000;
    let input = format!("{}a{}", "[".repeat(n), "]".repeat(n));
    let exp = format!("<p>{}</p>\n", input);

    html(&input, &exp);
}

#[test]
#[timeout(4000)]
fn pathological_unclosed_links() {
    let n = 50_000;
    let input = "[a](b".repeat(n);
    let exp = format!("<p>{}</p>\n", input);

    html(&input, &exp);
}

#[test]
#[timeout(4000)]
fn pathological_link_openers_with_references() {
    let n = 50_000;
    let input = format!("{}\n\n[a]: /u\n", "[a](".repeat(n));
    markdown_to_html(&input, &Options::default());
}

// input: python3 -c 'n = 10000; print(">" * n + "a")'
#[test]
#[timeout(4000)]
fn pathological_nested_block_quotes() {
    let n = 10_000;
    let input = format!("{}a", "> ".repeat(n));
    let exp = format!(
        "{}<p>a</p>\n{}",
        "<blockquote>\n".repeat(n),
        "</blockquote>\n".repeat(n)
    );

    html(&input, &exp);
}

#[test]
#[timeout(4000)]
fn pathological_nested_lists() {
    let n = 5_000;
    let input = "* ".repeat(n) + "a";
    markdown_to_html(&input, &Options::default());
}

#[test]
#[timeout(4000)]
fn pathological_backticks() {
    let n = 5_000;
    let mut input = String::new();
    for i in 1..=n {
        input += &"`".repeat(i);
        input += "a";
    }
    markdown_to_html(&input, &Options::default());
}

#[test]
#[timeout(4000)]
fn pathological_unclosed_html() {
    let n = 30_000;
    let input = "<!-- ".repeat(n) + &"<![CDATA[ ".repeat(n) + &"<? ".repeat(n);
    markdown_to_html(&input, &Options::default());
}

#[test]
#[timeout(4000)]
fn pathological_long_label() {
    let n = 1_000_000;
    let input = format!("[{}]\n\n[{}]: /u\n", "a".repeat(n), "a".repeat(n));
    let out = markdown_to_html(&input, &Options::default());
    assert!(!out.contains("href"));
}

#[test]
#[timeout(4000)]
fn pathological_reference_expansion() {
    let n = 10_000;
    let input = format!(
        "[a]: /{}\n\n{}",
        "x".repeat(1_000),
        "[a] ".repeat(n)
    );
    let out = markdown_to_html(&input, &Options::default());
    assert!(out.len() < 1_000 * n);
}

// input: python3 -c 'n = 10000; print("|" + "x|" * n + "\n|" + "-|" * n)'
#[test]
#[timeout(4000)]
fn pathological_table_columns_1() {
    let n = 100_000;
    let input = format!("{}{}{}{}", "|", "x|".repeat(n), "\n|", "-|".repeat(n));
    let exp = format!("<p>{}</p>\n", input);

    html_opts!([extension.table], &input, &exp);
}

// input: python3 -c 'n = 70000; print("|" + "x|" * n + "\n|" + "-|" * n + "\n" + "a\n" * n)'
#[test]
#[timeout(4000)]
fn pathological_table_columns_2() {
    let n = 100_000;
    let input = format!(
        "{}{}{}{}{}{}",
        "|",
        "x|".repeat(n),
        "\n|",
        "-|".repeat(n),
        "\n",
        "a\n".repeat(n)
    );

    let extension = Extension {
        table: true,
        ..Default::default()
    };

    // Not interested in the actual html, just that we don't timeout
    markdown_to_html(
        &input,
        &Options {
            extension,
            ..Default::default()
        },
    );
}

#[test]
fn pathological_recursion() {
    let n = 5_000;
    let input = format!("{}{}", "*a **a ".repeat(n), " a** a*".repeat(n));
    let exp = format!(
        "<p>{}{}</p>\n",
        "<em>a <strong>a ".repeat(n),
        " a</strong> a</em>".repeat(n)
    );

    html(&input, &exp);
}
