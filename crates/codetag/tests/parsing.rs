//! End-to-end parsing: file path to tag tree through the loader.

mod common;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use codetag::suggest::rank;
use codetag::{CodeFileParser, CodeLink, GrammarHandle, TagPath, parse_source};
use common::{MockFetcher, loader};
use tempfile::TempDir;

const PYTHON_SAMPLE: &str = "\
def hello_world():
    print(\"hi\")

class MyClass:
    def method(self):
        pass
";

/// Write `files` into a fresh directory.
fn workspace_with_files(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let paths = files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).expect("should write file");
            path
        })
        .collect();
    (dir, paths)
}

async fn ready_parser() -> (Arc<MockFetcher>, CodeFileParser) {
    let fetcher = Arc::new(MockFetcher::new());
    let loader = Arc::new(loader(&fetcher, None));
    loader.bootstrap().await.expect("static runtime boots");
    (fetcher, CodeFileParser::new(loader))
}

async fn handle(lang: &str) -> GrammarHandle {
    let fetcher = Arc::new(MockFetcher::new());
    loader(&fetcher, None).load(lang).await.expect("grammar loads")
}

// === Orchestration ===

#[tokio::test]
async fn python_file_yields_addressable_tree() {
    let (_dir, paths) = workspace_with_files(&[("utils.py", PYTHON_SAMPLE)]);
    let (_fetcher, parser) = ready_parser().await;

    let tree = parser
        .parse(&paths[0])
        .await
        .expect("parse should succeed")
        .expect("python is supported");

    assert_eq!(tree.len(), 3);
    let method = tree.at(&TagPath::from("MyClass>method")).expect("method");
    assert_eq!(method.name(), "method");
    assert_eq!(tree.parent(method).unwrap().name(), "MyClass");

    let hello = tree.at(&TagPath::from("hello_world")).expect("function");
    assert!(tree.parent(hello).unwrap().is_root());
    assert_eq!(method.content(), "def method(self):\n    pass");
}

#[tokio::test]
async fn unknown_extension_is_no_result() {
    let (_dir, paths) = workspace_with_files(&[("notes.md", "# title")]);
    let (fetcher, parser) = ready_parser().await;

    assert!(parser.parse(&paths[0]).await.unwrap().is_none());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn nothing_is_parsed_before_bootstrap() {
    let (_dir, paths) = workspace_with_files(&[("utils.py", PYTHON_SAMPLE)]);
    let fetcher = Arc::new(MockFetcher::new());
    let parser = CodeFileParser::new(Arc::new(loader(&fetcher, None)));

    assert!(parser.parse(&paths[0]).await.unwrap().is_none());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn every_parse_rereads_the_file() {
    let (_dir, paths) = workspace_with_files(&[("app.py", "def a():\n    pass\n")]);
    let (fetcher, parser) = ready_parser().await;

    let before = parser.parse(&paths[0]).await.unwrap().unwrap();
    fs::write(&paths[0], "def a():\n    pass\n\ndef b():\n    pass\n").unwrap();
    let after = parser.parse(&paths[0]).await.unwrap().unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 2);
    assert_eq!(fetcher.calls(), 1, "grammar is fetched once");
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (_fetcher, parser) = ready_parser().await;

    let result = parser.parse(&dir.path().join("absent.py")).await;

    assert!(matches!(result, Err(codetag::Error::Io(_))));
}

#[tokio::test]
async fn link_resolves_to_symbol_content() {
    let (dir, _paths) = workspace_with_files(&[("utils.py", PYTHON_SAMPLE)]);
    let (_fetcher, parser) = ready_parser().await;

    let link = CodeLink::parse("see [[utils.py#MyClass>method]]").expect("wiki link");
    assert_eq!(link.language().unwrap().name, "python");

    let tree = parser
        .parse(&dir.path().join(&link.file_link))
        .await
        .unwrap()
        .unwrap();
    let node = tree.at(link.tag_path.as_ref().unwrap()).unwrap();

    assert!(node.content().starts_with("def method(self):"));
}

// === Bundled queries ===

#[tokio::test]
async fn rust_query_captures_items_and_impls() {
    let source = r#"
mod shapes {
    pub struct Circle { r: f64 }

    impl Circle {
        pub fn new(r: f64) -> Self { Self { r } }
    }

    impl std::fmt::Display for Circle {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "circle")
        }
    }
}

trait Area {
    fn area(&self) -> f64;
}

macro_rules! square { ($x:expr) => { $x * $x }; }
"#;
    let tree = parse_source(&handle("rust").await, source).unwrap();

    let paths: Vec<String> = tree.dfs().iter().map(|n| n.tag_path().to_string()).collect();
    assert_eq!(
        paths,
        [
            "shapes",
            "shapes>Circle",
            "shapes>Circle",
            "shapes>Circle>new",
            "shapes>std::fmt::DisplayforCircle",
            "shapes>std::fmt::DisplayforCircle>fmt",
            "Area",
            "Area>area",
            "square",
        ]
    );

    let display = tree
        .at(&TagPath::from("shapes>std::fmt::DisplayforCircle"))
        .unwrap();
    assert_eq!(display.name(), "std::fmt::Display for Circle");

    // The impl block comes after the struct, so it owns the colliding path.
    let circle = tree.at(&TagPath::from("shapes>Circle")).unwrap();
    assert!(circle.text().starts_with("impl Circle"));
}

#[tokio::test]
async fn javascript_query_captures_classes_and_arrows() {
    let source = "\
class Greeter {
  greet(name) { return `hi ${name}`; }
}

function main() {}

const helper = () => 1;
";
    let tree = parse_source(&handle("javascript").await, source).unwrap();

    assert!(tree.at(&TagPath::from("Greeter>greet")).is_some());
    assert!(tree.at(&TagPath::from("main")).is_some());
    assert!(tree.at(&TagPath::from("helper")).is_some());
    assert_eq!(tree.len(), 4);
}

#[tokio::test]
async fn typescript_query_captures_types() {
    let source = "\
interface Shape { area(): number; }

enum Color { Red, Green }

type Id = string;

abstract class Base {
  abstract describe(): string;
  run(): void {}
}
";
    let tree = parse_source(&handle("typescript").await, source).unwrap();

    for path in ["Shape", "Color", "Id", "Base", "Base>describe", "Base>run"] {
        assert!(tree.at(&TagPath::from(path)).is_some(), "missing {path}");
    }
}

#[tokio::test]
async fn tsx_shares_the_typescript_query() {
    let source = "\
function App() {
  return <div className=\"app\">hello</div>;
}
";
    let handle = handle("tsx").await;
    assert!(handle.tags_query().unwrap().is_some());

    let tree = parse_source(&handle, source).unwrap();
    assert!(tree.at(&TagPath::from("App")).is_some());
}

fn dfs_paths(tree: &codetag::TagTree) -> Vec<String> {
    tree.dfs().iter().map(|n| n.tag_path().to_string()).collect()
}

#[tokio::test]
async fn c_query_captures_structs_and_functions() {
    let source = "\
struct P { int x; };

int add(int a, int b) { return a + b; }
";
    let tree = parse_source(&handle("c").await, source).unwrap();

    assert_eq!(dfs_paths(&tree), ["P", "add"]);
}

#[tokio::test]
async fn cpp_query_nests_namespaces_and_classes() {
    let source = "\
namespace ns {
class A {
  void f() {}
};
}

void A::g() {}
";
    let tree = parse_source(&handle("cpp").await, source).unwrap();

    assert_eq!(dfs_paths(&tree), ["ns", "ns>A", "ns>A>f", "A::g"]);
}

#[tokio::test]
async fn go_query_captures_types_methods_and_functions() {
    let source = "\
package main

type S struct{}

func (S) M() {}

func main() {}
";
    let tree = parse_source(&handle("go").await, source).unwrap();

    assert_eq!(dfs_paths(&tree), ["S", "M", "main"]);
}

#[tokio::test]
async fn suggestions_rank_the_typed_path_first() {
    let tree = parse_source(&handle("python").await, PYTHON_SAMPLE).unwrap();

    let ranked = rank(&tree, Some("MyClass,meth"));

    assert_eq!(ranked[0].tag_path().to_string(), "MyClass>method");
}
