//! Parsed HTML documents and XPath node matching.

use sxd_document::dom::ChildOfRoot;
use sxd_document::Package;
use sxd_xpath::{Context, Factory, Value, XPath};

pub use sxd_xpath::nodeset::Node;

use crate::error::{Result, ScrapeError};

/// An HTML page parsed into a navigable tree.
pub struct HtmlDocument {
    package: Package,
}

impl HtmlDocument {
    /// Parse page markup. `url` is only used for error reporting.
    pub fn parse(url: &str, html: &str) -> Result<Self> {
        let package = sxd_html::parse_html(html);
        let has_root = package
            .as_document()
            .root()
            .children()
            .iter()
            .any(|child| matches!(child, ChildOfRoot::Element(_)));
        if !has_root {
            return Err(ScrapeError::Parse {
                url: url.to_string(),
                reason: "document has no root element".to_string(),
            });
        }
        Ok(Self { package })
    }

    /// The document node, used as context for top-level rules.
    pub fn root(&self) -> Node<'_> {
        self.package.as_document().root().into()
    }
}

/// Compile an XPath expression.
pub fn compile(query: &str) -> std::result::Result<XPath, String> {
    Factory::new()
        .build(query)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "empty expression".to_string())
}

fn evaluate<'d>(node: Node<'d>, query: &str) -> Result<Vec<Node<'d>>> {
    let xpath = compile(query).map_err(|reason| ScrapeError::Query {
        query: query.to_string(),
        reason,
    })?;
    let context = Context::new();
    let value = xpath
        .evaluate(&context, node)
        .map_err(|e| ScrapeError::Query {
            query: query.to_string(),
            reason: e.to_string(),
        })?;

    match value {
        Value::Nodeset(nodes) => Ok(nodes.document_order()),
        // Strings, numbers and booleans never select a node.
        _ => Ok(Vec::new()),
    }
}

/// First node matching `query`, in document order.
pub fn find_one<'d>(node: Node<'d>, query: &str) -> Result<Option<Node<'d>>> {
    Ok(evaluate(node, query)?.into_iter().next())
}

/// Every node matching `query`, in document order.
pub fn find_all<'d>(node: Node<'d>, query: &str) -> Result<Vec<Node<'d>>> {
    evaluate(node, query)
}

/// Concatenated text of the node and its descendants.
pub fn inner_text(node: Node<'_>) -> String {
    node.string_value()
}

/// Attribute value, or an empty string when the attribute (or element) is missing.
pub fn attribute(node: Node<'_>, name: &str) -> String {
    match node {
        Node::Element(element) => element.attribute_value(name).unwrap_or_default().to_string(),
        _ => String::new(),
    }
}
