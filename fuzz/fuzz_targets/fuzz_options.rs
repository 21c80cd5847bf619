#![no_main]

use libfuzzer_sys::fuzz_target;

use mdhtml::{markdown_to_html, try_markdown_to_html, Options};

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput<'s> {
    s: &'s str,
    opts: Options,
}

fuzz_target!(|i: FuzzInput| {
    let total = markdown_to_html(i.s, &i.opts);

    // Within the limits, both entry points agree.
    if let Ok(checked) = try_markdown_to_html(i.s, &i.opts) {
        assert_eq!(checked, total);
    }
});
