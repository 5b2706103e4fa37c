use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_refindex")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read_output(dir: &TempDir, name: &str) -> String {
    std::fs::read_to_string(dir.path().join(name)).unwrap()
}

// -- search --

#[test]
fn search_lists_all_identifiers() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("search.txt");

    cmd()
        .arg("search")
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "search.txt");
    assert!(output.contains("NULL => cpp/types/NULL\n"));
    assert!(output.contains("std::vector::size => cpp/container/vector/size\n"));
    // constructor/destructor names derive from the class name
    assert!(output.contains("std::vector::vector => cpp/container/vector/vector\n"));
    assert!(output.contains("std::vector::~vector => cpp/container/vector/~vector\n"));
    // inherited members are reparented but keep the base class's pages
    assert!(output.contains("std::stack::size => cpp/container/vector/size\n"));
    assert!(output.contains("std::stack::pop_back => cpp/container/vector/pop_back\n"));
    // alias typedefs expand the aliased class's members
    assert!(output.contains("std::vec_alias::size => cpp/container/vector/size\n"));
}

#[test]
fn search_rejects_malformed_index() {
    let dir = TempDir::new().unwrap();
    let index = dir.path().join("bad.xml");
    std::fs::write(&index, "<index><class></index>").unwrap();

    cmd()
        .arg("search")
        .arg(&index)
        .arg(dir.path().join("out.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse index"));
}

// -- highlight --

#[test]
fn highlight_drops_members_and_inherited_entries() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("highlight.txt");

    cmd()
        .arg("highlight")
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "highlight.txt");
    assert!(output.contains("std::vector => cpp/container/vector\n"));
    assert!(output.contains("std::stack => cpp/container/stack\n"));
    assert!(!output.contains("size"));
    assert!(!output.contains("pop_back"));
    assert!(!output.contains("~vector"));
}

// -- browser --

#[test]
fn browser_emits_nested_html() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("browser.html");

    cmd()
        .arg("browser")
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "browser.html");
    assert!(output.contains("<tt><b>std::vector</b></tt>"));
    assert!(output.contains("<span class=\"mark\">(class)</span>"));
    assert!(output.contains("<span class=\"mark\">(function)</span>"));
    assert!(output.contains(
        "<a href=\"http://en.cppreference.com/w/cpp/container/vector\">cpp/container/vector</a>"
    ));
}

// -- devhelp --

#[test]
fn devhelp_includes_chapters_and_keywords() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("book.devhelp2");

    cmd()
        .arg("devhelp")
        .args(["--base", "/usr/share/doc/cppreference"])
        .args(["--chapters", &fixture_path("chapters.xml")])
        .args(["--title", "C++ reference"])
        .args(["--name", "cppreference-doc-en-cpp"])
        .args(["--link", "en/cpp.html"])
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "book.devhelp2");
    assert!(output.starts_with("<?xml version=\"1.0\"?>\n<book title=\"C++ reference\""));
    assert!(output.contains("<sub name=\"Containers\" link=\"cpp/container.html\"/>"));
    assert!(output.contains(
        "<keyword type=\"class\" name=\"std::vector\" link=\"cpp/container/vector\"/>"
    ));
    assert!(output.contains(
        "<keyword type=\"function\" name=\"std::vector::pop_back\" link=\"cpp/container/vector/pop_back\"/>"
    ));
    assert!(output.contains("<keyword type=\"macro\" name=\"NULL\" link=\"cpp/types/NULL\"/>"));
}

// -- doxygen tag --

#[test]
fn doxygen_tag_groups_by_namespace() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("cppreference-doxygen-web.tag.xml");

    cmd()
        .arg("doxygen-tag")
        .arg("web")
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "cppreference-doxygen-web.tag.xml");
    assert!(output.contains("<compound kind=\"namespace\">\n    <name>std</name>"));
    assert!(output.contains("<compound kind=\"class\">\n    <name>std::vector</name>"));
    assert!(output.contains("<name>pop_back</name>"));
    assert!(output.contains("<anchorfile>cpp/container/vector/pop_back</anchorfile>"));
}

#[test]
fn doxygen_tag_resolves_links_through_map() {
    let dir = TempDir::new().unwrap();
    let map_path = dir.path().join("link-map.xml");
    let out = dir.path().join("tag.xml");

    cmd()
        .arg("link-map")
        .arg(fixture_path("reference"))
        .arg(&map_path)
        .assert()
        .success();

    cmd()
        .arg("doxygen-tag")
        .arg(&map_path)
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "tag.xml");
    // pop_back's page exists in the reference tree
    assert!(output.contains("<anchorfile>cpp/container/vector/pop_back.html</anchorfile>"));
    // size has no page: the sentinel goes in, the run keeps going
    assert!(output.contains("<anchorfile>404</anchorfile>"));
}

// -- autolinker --

#[test]
fn autolinker_emits_groups_and_links() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("autolinker.json");

    cmd()
        .arg("autolinker")
        .arg(fixture_path("index.xml"))
        .arg(&out)
        .assert()
        .success();

    let defs: serde_json::Value =
        serde_json::from_str(&read_output(&dir, "autolinker.json")).unwrap();

    let groups = defs["groups"].as_array().unwrap();
    let vector = groups
        .iter()
        .find(|g| g["name"] == "std::vector")
        .unwrap();
    assert_eq!(vector["base_url"], "cpp/container/vector");
    assert!(vector["urls"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("/pop_back")));

    let links = defs["links"].as_array().unwrap();
    assert!(links.iter().any(|l| l["string"] == "pop_back"
        && l["on_group"] == "std::vector"
        && l["target"] == "cpp/container/vector/pop_back"));
}

// -- link map --

#[test]
fn link_map_skips_pages_without_marker() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("link-map.xml");

    cmd()
        .arg("link-map")
        .arg(fixture_path("reference"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "link-map.xml");
    assert!(output.contains(
        "<file from=\"cpp/container/vector\" to=\"cpp/container/vector.html\"/>"
    ));
    assert!(output.contains(
        "<file from=\"cpp/container/vector/pop_back\" to=\"cpp/container/vector/pop_back.html\"/>"
    ));
    // notes.html has no wgPageName marker
    assert_eq!(output.matches("<file ").count(), 2);
}

// -- duckduckgo feed --

#[test]
fn ddg_emits_abstracts_and_redirects() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("output.txt");

    cmd()
        .arg("ddg")
        .arg(fixture_path("index.xml"))
        .arg(fixture_path("reference"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "output.txt");

    // class abstract from the class page
    let class_line = output
        .lines()
        .find(|l| l.starts_with("std::vector\t"))
        .unwrap();
    assert_eq!(class_line.matches('\t').count(), 12);
    assert!(class_line.contains("\tA\t"));
    assert!(class_line.contains("A sequence container that encapsulates dynamic size arrays."));
    assert!(class_line.contains("template&lt; class T &gt; class vector;"));
    assert!(class_line.ends_with("http://en.cppreference.com/w/cpp/container/vector"));

    // two identifiers share pop_back's page: one abstract line each
    let pop_back_lines: Vec<&str> = output
        .lines()
        .filter(|l| l.contains("\tA\t") && l.contains("pop_back"))
        .collect();
    assert_eq!(pop_back_lines.len(), 2);
    assert!(output.contains("std::vector::pop_back\tA\t"));
    assert!(output.contains("std::stack::pop_back\tA\t"));
    // only the first sentence of the description survives
    assert!(output.contains("Removes the last element of the container."));
    assert!(!output.contains("Iterators to the removed element"));

    // redirects: unqualified "pop back" is claimed by two targets → dropped
    assert!(output.contains("vector pop back\tR\tstd::vector::pop_back\t"));
    assert!(output.contains("stack pop back\tR\tstd::stack::pop_back\t"));
    assert!(!output.lines().any(|l| l.starts_with("pop_back\t")));
    assert!(!output.lines().any(|l| l.starts_with("pop back\t")));
}

#[test]
fn ddg_debug_mode_reports_skipped_identifiers() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("output.txt");

    cmd()
        .arg("ddg")
        .arg("--debug")
        .arg(fixture_path("index.xml"))
        .arg(fixture_path("reference"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "output.txt");
    // No identifier in this fixture hits an unsupported shape, so no
    // diagnostic comments are expected; the flag must not break the run.
    assert!(output.contains("std::vector\tA\t"));
}

#[test]
fn ddg_debug_ident_filters_pages() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("output.txt");

    cmd()
        .arg("ddg")
        .args(["--debug-ident", "pop_back"])
        .arg(fixture_path("index.xml"))
        .arg(fixture_path("reference"))
        .arg(&out)
        .assert()
        .success();

    let output = read_output(&dir, "output.txt");
    assert!(output.contains("std::vector::pop_back\tA\t"));
    assert!(!output.contains("std::vector\tA\t"));
}
