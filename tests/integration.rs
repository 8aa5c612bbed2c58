use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_refdoc")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(dir: &Path, rel: &str) -> String {
    std::fs::read_to_string(dir.join(rel)).unwrap_or_else(|e| panic!("{}: {}", rel, e))
}

/// Render the fixture catalog with the fixture config into a fresh directory.
fn render_site(extra: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["render", "-c", &fixture_path("refdoc.toml")])
        .args(["-o", dir.path().to_str().unwrap()])
        .args(extra)
        .arg(fixture_path("catalog.json"))
        .assert()
        .success();
    dir
}

// -- render --

#[test]
fn render_writes_one_page_per_published_entry() {
    let dir = render_site(&[]);
    for page in [
        "functions/acme_render_widget.html",
        "functions/acme_legacy_widget.html",
        "classes/acme_widget.html",
        "methods/acme_widget-draw.html",
        "hooks/acme_widget_html.html",
    ] {
        assert!(dir.path().join(page).is_file(), "missing {}", page);
    }
    assert!(!dir.path().join("functions/acme_old_widget.html").exists());
}

#[test]
fn function_page_content() {
    let dir = render_site(&[]);
    let html = read(dir.path(), "functions/acme_render_widget.html");

    assert!(html.contains("<div class=\"summary\">Renders a <code>&lt;div&gt;</code> widget.</div>"));
    assert!(html.contains(
        "<h1 class=\"signature\">acme_render_widget( <span class=\"arg-type\">Acme_Widget</span>&nbsp;<span class=\"arg-name\">$widget</span>, "
    ));
    // {@see Acme_Widget} resolves to the class page
    assert!(html.contains(
        "The widget, see <a href=\"https://docs.acme.test/reference/classes/acme_widget/\">Acme_Widget</a>."
    ));
    // hash notation parameter, optional, default sentence dropped
    assert!(html.contains("<b>'class'</b>"));
    assert!(html.contains("<span class=\"required\">(Optional)</span> <span class=\"description\">Render arguments.<ul class=\"param-hash\">"));
    assert!(!html.contains("Default empty array."));
    assert!(html.contains("<p class=\"default\">Default value: array()</p>"));
    assert!(html.contains("<span class=\"return-type\">(string)</span> Widget HTML."));
    // see also, method nested under its class
    assert!(html.contains(
        "<li><a href=\"https://docs.acme.test/reference/classes/acme_widget/draw/\">Acme_Widget::draw()</a>: Does the drawing.</li>"
    ));
    // changelog
    assert!(html.contains("<td><a href=\"https://docs.acme.test/reference/since/1-0-0/\">1.0.0</a></td><td>Introduced.</td>"));
    assert!(html.contains(
        "<span class=\"since-description\">Added the <a href=\"https://docs.acme.test/reference/hooks/acme_widget_html/\">&#039;acme_widget_html&#039;</a> filter.</span>"
    ));
    // namespace
    assert!(html.contains("<a href=\"https://docs.acme.test/reference/namespace/acme-render/\">Render</a>"));
}

#[test]
fn function_page_source_excerpt() {
    let dir = render_site(&[]);
    let html = read(dir.path(), "functions/acme_render_widget.html");

    assert!(html.contains("<pre class=\"brush: php; toolbar: false; first-line: 6\">function acme_render_widget( $widget, $args = array() ) {"));
    assert!(html.contains("apply_filters( &#039;acme_widget_html&#039;, $html, $widget );\n}\n</pre>"));
    assert!(html.contains("File: <a href=\"https://docs.acme.test/reference/files/src-widgets-php/\">src/widgets.php</a>"));
    assert!(html.contains("<a href=\"https://github.com/acme/widgets/tree/2.1.0/src/widgets.php#L6\">View on GitHub</a>"));
}

#[test]
fn class_and_method_pages() {
    let dir = render_site(&[]);
    let class = read(dir.path(), "classes/acme_widget.html");
    assert!(class.contains("<h1 class=\"signature\">Acme_Widget</h1>"));
    assert!(class.contains(
        "<li><a href=\"https://docs.acme.test/reference/classes/acme_widget/draw/\">draw</a> &mdash; Draws the widget.</li>"
    ));

    let method = read(dir.path(), "methods/acme_widget-draw.html");
    assert!(method.contains("<link rel=\"canonical\" href=\"https://docs.acme.test/reference/classes/acme_widget/draw/\">"));
    assert!(method.contains("<li><a href=\"https://docs.acme.test/reference/classes/acme_widget/\">Acme_Widget</a></li>"));
}

#[test]
fn hook_page() {
    let dir = render_site(&[]);
    let html = read(dir.path(), "hooks/acme_widget_html.html");
    assert!(html.contains("<span class=\"hook-func\">apply_filters</span>( 'acme_widget_html', "));
    assert!(!html.contains("(Required)"));
    // hooks link to their file but carry no excerpt
    assert!(html.contains("File: <a href="));
    assert!(!html.contains("<pre"));
}

#[test]
fn deprecated_and_private_notices() {
    let dir = render_site(&[]);
    let html = read(dir.path(), "functions/acme_legacy_widget.html");
    assert!(html.contains(
        "<div class=\"deprecated notice notice-warning\"><p>This function has been deprecated. Use \
         <a href=\"https://docs.acme.test/reference/functions/acme_render_widget/\">acme_render_widget()</a> instead.</p></div>"
    ));
    assert!(html.contains("<div class=\"private-access notice notice-error\">"));
    // deprecation version is a known since term, so it gets a changelog row
    assert!(html.contains("<a href=\"https://docs.acme.test/reference/since/2-0-0/\">2.0.0</a></td><td>This function has been deprecated."));
}

#[test]
fn related_section() {
    let dir = render_site(&[]);
    let html = read(dir.path(), "functions/acme_render_widget.html");
    assert!(html.contains("<div class=\"uses\">\n<h3>Uses</h3>"));
    assert!(html.contains(
        "<li><span>src/widgets.php:</span> <a href=\"https://docs.acme.test/reference/classes/acme_widget/draw/\">Acme_Widget::draw()</a></li>"
    ));
    assert!(html.contains(
        "<a href=\"https://docs.acme.test/reference/hooks/acme_widget_html/\">acme_widget_html</a></li>"
    ));
    assert!(html.contains(
        "<div class=\"used-by\">\n<h3>Used By</h3>\n<ul>\n  <li><span>:</span> <a href=\"https://docs.acme.test/reference/functions/acme_legacy_widget/\">acme_legacy_widget()</a></li>"
    ));

    let hook = read(dir.path(), "hooks/acme_widget_html.html");
    assert!(hook.contains(
        "<li><span>src/widgets.php:</span> <a href=\"https://docs.acme.test/reference/functions/acme_render_widget/\">acme_render_widget()</a></li>"
    ));
}

#[test]
fn render_output_names_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("case.json");
    std::fs::write(
        &catalog,
        r#"{"entries": [
            {"id": 1, "name": "Acme_Thing", "title": "Acme_Thing", "kind": "function"},
            {"id": 2, "name": "acme_thing", "title": "acme_thing", "kind": "function"}
        ]}"#,
    )
    .unwrap();
    let out = dir.path().join("site");
    cmd()
        .args(["render", "-o", out.to_str().unwrap()])
        .arg(&catalog)
        .assert()
        .success();
    assert!(read(&out, "functions/acme_thing.html").contains("<title>Acme_Thing</title>"));
    assert!(read(&out, "functions/2.html").contains("<title>acme_thing</title>"));
}

#[test]
fn render_skips_catalog_with_duplicate_ids_whole() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(
        &bad,
        r#"{"entries": [
            {"id": 50, "name": "acme_extra", "title": "acme_extra", "kind": "function"},
            {"id": 50, "name": "acme_clash", "title": "acme_clash", "kind": "function"}
        ]}"#,
    )
    .unwrap();
    let out = dir.path().join("site");
    cmd()
        .args(["render", "-o", out.to_str().unwrap()])
        .arg(fixture_path("catalog.json"))
        .arg(&bad)
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping catalog"));
    assert!(out.join("functions/acme_render_widget.html").is_file());
    assert!(!out.join("functions/acme_extra.html").exists());
}

#[test]
fn render_only_filter() {
    let dir = render_site(&["--only", "Acme_Widget"]);
    assert!(dir.path().join("classes/acme_widget.html").is_file());
    assert!(!dir.path().join("functions").exists());
}

#[test]
fn render_only_unknown_name_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["render", "--only", "nope", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("catalog.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no published entry named nope"));
}

#[test]
fn render_json() {
    let dir = render_site(&["-f", "json"]);
    let json = read(dir.path(), "functions/acme_render_widget.json");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["url"], "https://docs.acme.test/reference/functions/acme_render_widget/");
    assert_eq!(value["params"][0]["required"], true);
    assert_eq!(value["params"][1]["required"], false);
    assert_eq!(value["changelog"][0]["version"], "1.0.0");
    assert_eq!(value["related"][0]["slug"], "uses");
    assert_eq!(value["related"][1]["items"][0]["title"], "acme_legacy_widget()");
}

#[test]
fn render_directory_of_catalogs_with_overrides() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["render", "--home-url", "https://other.test", "--no-prefix"])
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path(""))
        .assert()
        .success();
    let html = read(dir.path(), "classes/acme_widget.html");
    assert!(html.contains("href=\"https://other.test/classes/acme_widget/draw/\""));
}

#[test]
fn unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["render", "-f", "markdown", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("catalog.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: markdown"));
}

#[test]
fn no_catalogs_loaded_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .args(["render", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("does-not-exist-*.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entries loaded"));
}

#[test]
fn invalid_config_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "use_prefix = \"yes\"\n").unwrap();
    cmd()
        .args(["render", "-c", config.to_str().unwrap(), "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("catalog.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.toml"));
}

// -- format --

#[test]
fn format_summary_from_stdin() {
    cmd()
        .args(["format", "summary"])
        .write_stdin("Use the `<br>` tag, not <!-- comments -->.\n")
        .assert()
        .success()
        .stdout("Use the <code>&lt;br&gt;</code> tag, not <code>&lt;!-- comments --&gt;</code>.\n");
}

#[test]
fn format_param_hash() {
    cmd()
        .args(["format", "param"])
        .write_stdin("{ @type string $foo Optional. A thing. }\n")
        .assert()
        .success()
        .stdout(
            "<ul class=\"param-hash\"><li><b>'foo'</b><br /><i><span class='type'>(string)</span></i> Optional. A thing.</li>\n</ul>\n\n",
        );
}

#[test]
fn format_links_against_catalog() {
    cmd()
        .args(["format", "links", "--catalog"])
        .arg(fixture_path("catalog.json"))
        .write_stdin("See {@see acme_render_widget()} and {@see Unknown_Class}.")
        .assert()
        .success()
        .stdout(
            "See <a href=\"http://localhost/reference/functions/acme_render_widget/\">acme_render_widget()</a> and Unknown_Class.\n",
        );
}

#[test]
fn format_links_lenient_without_catalog() {
    cmd()
        .args(["format", "links", "--lenient-links"])
        .write_stdin("{@see not_indexed()}")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<a href=\"http://localhost/reference/functions/not_indexed/\">not_indexed()</a>",
        ));
}

#[test]
fn format_rejects_unknown_kind() {
    cmd()
        .args(["format", "title"])
        .write_stdin("x")
        .assert()
        .failure();
}
