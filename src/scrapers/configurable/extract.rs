//! Rule evaluation against parsed documents.

use tracing::debug;
use url::Url;

use super::super::document::{attribute, find_all, find_one, inner_text, Node};
use crate::config::{Rule, Rules};
use crate::error::Result;
use crate::models::{FieldValue, Record};
use crate::utils::resolve;

/// Apply every rule to `node`, in declaration order, and collect the results.
///
/// Rules that match nothing are left out of the record; `elements` rules
/// recurse with each matched node as the new context.
pub fn extract(node: Node<'_>, rules: &Rules, base_url: &Url) -> Result<Record> {
    let mut record = Record::new();
    for (name, rule) in rules.iter() {
        if let Some(value) = extract_field(node, rule, base_url)? {
            record.set(name, value);
        }
    }
    Ok(record)
}

/// Evaluate one rule. `None` means the field is absent.
pub fn extract_field(node: Node<'_>, rule: &Rule, base_url: &Url) -> Result<Option<FieldValue>> {
    match rule {
        Rule::Text { xpath, trim } => {
            let Some(found) = find_one(node, xpath)? else {
                return Ok(None);
            };
            let text = inner_text(found);
            let text = if *trim { text.trim().to_string() } else { text };
            Ok(Some(FieldValue::Text(text)))
        }
        Rule::Attribute {
            xpath,
            attribute: name,
            resolve_url,
        } => {
            let Some(found) = find_one(node, xpath)? else {
                return Ok(None);
            };
            let value = attribute(found, name);
            if !*resolve_url {
                return Ok(Some(FieldValue::Text(value)));
            }
            match resolve(base_url, &value) {
                Ok(url) => Ok(Some(FieldValue::Text(url.to_string()))),
                Err(err) => {
                    debug!("Keeping unresolved {} value {:?}: {}", name, value, err);
                    Ok(Some(FieldValue::Text(value)))
                }
            }
        }
        Rule::Elements { xpath, elements } => {
            let records = find_all(node, xpath)?
                .into_iter()
                .map(|child| extract(child, elements, base_url))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(FieldValue::Records(records)))
        }
    }
}
