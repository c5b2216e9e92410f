//! End-to-end tests: token stream -> parse loop -> assembly -> validation

use tokenfold::fold::assembly::assemble;
use tokenfold::fold::config::{ExtractorConfig, GrammarConfig};
use tokenfold::fold::node::{Attribute, NodeKind, SequenceNode};
use tokenfold::fold::parser::{Classifier, Parser};
use tokenfold::fold::registry::NodeRegistry;
use tokenfold::fold::sequence::{LinkId, Sequence};
use tokenfold::fold::source::CommentSource;
use tokenfold::fold::testing::{assert_node, reachable, tokens_of};
use tokenfold::fold::token::RawToken;
use tokenfold::fold::view::FormatRegistry;

const GRAMMAR: &str = r#"
[[kinds]]
name = "description"
primary = false
absorb_next = "description"

[[kinds]]
name = "function"
absorb_previous = "description"
children = ["@param", "@returns"]

[[kinds]]
name = "@param"
primary = false

[[kinds]]
name = "@returns"
primary = false
"#;

fn grammar() -> NodeRegistry {
    GrammarConfig::from_toml_str(GRAMMAR)
        .expect("grammar to parse")
        .into_registry()
        .expect("kinds to register")
}

/// Naive line tokenizer for doc comment blocks: `@tag rest` lines become `@tag` tokens,
/// everything else is description text
fn tokenize(block: &str) -> Vec<RawToken> {
    block
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(' ') {
            Some((tag, rest)) if tag.starts_with('@') => RawToken::new(tag, rest),
            _ => RawToken::new("description", line),
        })
        .collect()
}

#[test]
fn test_empty_stream_yields_sentinel_only() {
    let mut parser = Parser::new();

    let first = parser.parse(Vec::new()).expect("sentinel");

    assert_eq!(parser.last(), Some(first));
    assert_eq!(parser.sequence().len(), 1);
    assert!(assemble(parser.sequence_mut(), &grammar()).is_empty());
}

/// Folds every run of `line` tokens into one `para` link
struct Paragraphs;

impl Classifier for Paragraphs {
    fn classify(&mut self, sequence: &mut Sequence, token: RawToken, last: LinkId) -> LinkId {
        if token.value == "line" && sequence.value(last) == "para" {
            let joined = format!("{}\n{}", sequence.data(last), token.data);
            let previous = sequence.previous(last);
            sequence.remove(last);
            return sequence.push_after(previous, RawToken::new("para", joined));
        }
        let value = if token.value == "line" {
            "para".to_string()
        } else {
            token.value
        };
        sequence.push_after(Some(last), RawToken::new(value, token.data))
    }
}

#[test]
fn test_custom_classifier_state_machine() {
    let mut parser = Parser::with_classifier(Paragraphs);

    let first = parser
        .parse(tokens_of(&[
            ("line", "one"),
            ("line", "two"),
            ("rule", "---"),
            ("line", "three"),
        ]))
        .expect("first link");

    let links = reachable(parser.sequence(), first);
    assert_eq!(
        links[1..],
        [
            ("para".to_string(), "one\ntwo".to_string()),
            ("rule".to_string(), "---".to_string()),
            ("para".to_string(), "three".to_string()),
        ]
    );

    let mut registry = NodeRegistry::new();
    registry
        .register_kind(NodeKind::new("para"))
        .expect("kind to register");
    let doc = assemble(parser.sequence_mut(), &registry);

    let texts: Vec<_> = doc.nodes_named("para").map(SequenceNode::text).collect();
    assert_eq!(texts, vec!["one\ntwo", "three"]);
}

/// Moves every `title` token to the front of the chain, right after the sentinel
struct HoistTitles;

impl Classifier for HoistTitles {
    fn classify(&mut self, sequence: &mut Sequence, token: RawToken, last: LinkId) -> LinkId {
        if token.value == "title" {
            sequence.push_after(Some(sequence.head(last)), token);
            return last;
        }
        sequence.push_after(Some(last), token)
    }
}

#[test]
fn test_mid_chain_inserts_assemble_in_document_order() {
    let mut parser = Parser::with_classifier(HoistTitles);
    parser.parse(tokens_of(&[
        ("para", "body"),
        ("title", "Heading"),
        ("para", "more"),
    ]));
    let mut registry = NodeRegistry::new();
    registry
        .register_kind(NodeKind::new("title").absorb_next("para"))
        .expect("kind to register");
    registry
        .register_kind(NodeKind::new("para"))
        .expect("kind to register");

    let doc = assemble(parser.sequence_mut(), &registry);

    assert_eq!(doc.len(), 1);
    assert_node(&doc.nodes[0])
        .name("title")
        .payload(&["Heading", "body", "more"]);
}

#[test]
fn test_doc_comment_pipeline() {
    let source = r#"
/**
 * Adds two numbers.
 * Handles negatives.
 * @param a first operand
 * @param b second operand
 * @returns the sum
 */
function add(a, b) { return a + b; }
"#;
    let blocks = CommentSource::from_string(source, &ExtractorConfig::default()).into_blocks();
    assert_eq!(blocks.len(), 1);

    // Description lines sit right before the function token, tags after it.
    let (description, tags): (Vec<_>, Vec<_>) = tokenize(&blocks[0])
        .into_iter()
        .partition(|token| token.value == "description");

    let mut parser = Parser::new();
    parser.parse(
        description
            .into_iter()
            .chain([RawToken::new("function", "add")])
            .chain(tags),
    );
    let doc = assemble(parser.sequence_mut(), &grammar());

    assert_eq!(doc.len(), 1);
    assert_node(&doc.nodes[0])
        .name("function")
        .payload(&["Adds two numbers.", "Handles negatives.", "add"])
        .child_count("param", 2)
        .child_count("returns", 1)
        .child("param", 1, |param| {
            param.name("@param").payload(&["b second operand"]);
        });
    assert!(doc.validate());
}

fn build_function_with_arity(
    sequence: &mut Sequence,
    token: LinkId,
    registry: &NodeRegistry,
) -> Option<SequenceNode> {
    let kind = NodeKind::new("function").child("@param");
    let mut node = SequenceNode::construct(sequence, token, &kind, registry);
    let arity = node.children_of("param").len() as i64;
    node.set_attribute("arity", Attribute::Number(arity));
    Some(node)
}

fn build_anonymous(
    _sequence: &mut Sequence,
    _token: LinkId,
    _registry: &NodeRegistry,
) -> Option<SequenceNode> {
    Some(SequenceNode::new("", vec![]))
}

#[test]
fn test_function_constructor_adds_attributes() {
    let mut registry = grammar();
    registry
        .register("function", build_function_with_arity)
        .expect("function to register");

    let mut parser = Parser::new();
    parser.parse(tokens_of(&[("function", "f"), ("@param", "x"), ("@param", "y")]));
    let doc = assemble(parser.sequence_mut(), &registry);

    assert_eq!(
        doc.nodes[0].attributes.get("arity"),
        Some(&Attribute::Number(2))
    );
    let json = FormatRegistry::with_defaults()
        .serialize(&doc, "json")
        .expect("json output");
    assert!(json.contains("\"arity\": 2"));
}

#[test]
fn test_invalid_node_fails_validation() {
    let mut registry = NodeRegistry::new();
    registry
        .register("anonymous", build_anonymous)
        .expect("function to register");

    let mut parser = Parser::new();
    parser.parse(tokens_of(&[("anonymous", "x")]));
    let doc = assemble(parser.sequence_mut(), &registry);

    assert_eq!(doc.len(), 1);
    assert!(!doc.validate());
}

#[test]
fn test_parser_display_lists_tokens() {
    let mut parser = Parser::new();
    assert_eq!(parser.to_string(), "");

    parser.parse(tokens_of(&[("text", "hi")]));

    let printed: Vec<RawToken> = serde_json::from_str(&parser.to_string()).expect("json listing");
    assert_eq!(printed[1], RawToken::new("text", "hi"));
}
