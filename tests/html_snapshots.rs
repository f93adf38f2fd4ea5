//! Representative HTML conversions pinned with inline snapshots.

use doctree::convert::html::HtmlConverter;
use doctree::convert::Converter;
use doctree::parser::Parser;

fn render(text: &str) -> String {
    let (doc, _) = Parser::default().parse(text);
    HtmlConverter.convert(&doc)
}

#[test]
fn snapshot_admonition_and_list() {
    let html = render("NOTE: read this first.\n\n- one\n- two\n");
    insta::assert_snapshot!(html, @r###"<article><div class="admonition note"><div class="title">NOTE</div><p>read this first.</p></div><ul><li>one</li><li>two</li></ul></article>"###);
}

#[test]
fn snapshot_table_with_header() {
    let html = render("[header=true]\n|===\n|Name |Age\n|Ada |36\n|===\n");
    insta::assert_snapshot!(html, @r###"<article><table><thead><tr><th>Name</th><th>Age</th></tr></thead><tbody><tr><td>Ada</td><td>36</td></tr></tbody></table></article>"###);
}

#[test]
fn snapshot_footnote_definition_and_reference() {
    let html = render("Start.footnote:[a note]\n");
    insta::assert_snapshot!(html, @r###"<article><p>Start.<sup><a href="#fn-1" id="fnref-1">[1]</a></sup></p><div class="footnotes"><hr/><ol><li id="fn-1">a note <a href="#fnref-1">↩</a></li></ol></div></article>"###);
}
