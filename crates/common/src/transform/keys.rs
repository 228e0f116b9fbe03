//! Key-convention conversion between wire and application payloads.
//!
//! The backend speaks snake_case, application code speaks lowerCamelCase.
//! Conversion walks the whole payload tree iteratively over an explicit
//! work stack so hostile nesting depth cannot overflow the call stack;
//! nodes beyond [`super::MAX_DEPTH`] pass through unchanged.

use serde_json::Value;

use super::MAX_DEPTH;

/// Target key convention for a conversion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyStyle {
    /// Wire convention (`my_field`).
    Snake,
    /// Application convention (`myField`).
    Camel,
}

impl KeyStyle {
    fn convert(self, key: &str) -> String {
        match self {
            Self::Snake => camel_to_snake(key),
            Self::Camel => snake_to_camel(key),
        }
    }
}

/// Convert `myField` to `my_field`.
#[must_use]
pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert `my_field` to `myField`.
#[must_use]
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            // Leading underscores are preserved; separators are consumed.
            if out.is_empty() {
                out.push(ch);
            } else {
                upper_next = true;
            }
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Rename every object key in the tree to the target convention.
pub(crate) fn convert_keys(root: &mut Value, style: KeyStyle) {
    let mut stack: Vec<(&mut Value, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            continue;
        }
        match node {
            Value::Object(map) => {
                let entries = std::mem::take(map);
                for (key, child) in entries {
                    let _ = map.insert(style.convert(&key), child);
                }
                for child in map.values_mut() {
                    stack.push((child, depth + 1));
                }
            }
            Value::Array(items) => {
                for child in items.iter_mut() {
                    stack.push((child, depth + 1));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn camel_to_snake_handles_common_shapes() {
        assert_eq!(camel_to_snake("dueDate"), "due_date");
        assert_eq!(camel_to_snake("vatRatePercent"), "vat_rate_percent");
        assert_eq!(camel_to_snake("amount"), "amount");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn snake_to_camel_handles_common_shapes() {
        assert_eq!(snake_to_camel("due_date"), "dueDate");
        assert_eq!(snake_to_camel("vat_rate_percent"), "vatRatePercent");
        assert_eq!(snake_to_camel("amount"), "amount");
    }

    #[test]
    fn conversion_reaches_nested_objects_and_arrays() {
        let mut value = json!({
            "invoiceLines": [
                { "unitPrice": 10, "taxRate": { "ratePercent": 19 } },
            ],
            "customerRef": { "displayName": "ACME" },
        });
        convert_keys(&mut value, KeyStyle::Snake);

        assert_eq!(
            value,
            json!({
                "invoice_lines": [
                    { "unit_price": 10, "tax_rate": { "rate_percent": 19 } },
                ],
                "customer_ref": { "display_name": "ACME" },
            })
        );
    }

    #[test]
    fn scalars_pass_through_unchanged() {
        let mut value = json!("just a string");
        convert_keys(&mut value, KeyStyle::Camel);
        assert_eq!(value, json!("just a string"));
    }
}
