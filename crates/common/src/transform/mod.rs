//! Structural conversion between wire and application payloads.
//!
//! Two symmetric pipelines shape every payload crossing the API boundary:
//!
//! - [`to_wire`] (outgoing): field filtering, camelCase → snake_case key
//!   conversion, date formatting, boolean and number coercion, optional
//!   null stripping.
//! - [`from_wire`] (incoming): snake_case → camelCase key conversion, date
//!   parsing into the canonical application form, boolean and number
//!   coercion. Filtering and null stripping are not applied on the
//!   response path.
//!
//! Which fields each step touches is declared per resource in a
//! [`TransformProfile`]; see [`Resource`] for the closed set of profiles.
//!
//! All tree walks are iterative over explicit stacks and bounded at
//! [`MAX_DEPTH`]; subtrees beyond the bound pass through unchanged.

mod coerce;
mod keys;
mod profile;

use std::collections::HashSet;

use serde_json::Value;

pub use keys::{camel_to_snake, snake_to_camel};
pub use profile::{DateFormat, Resource, TransformProfile};

/// Maximum tree depth any transformation descends to.
pub const MAX_DEPTH: usize = 64;

/// Shape an outgoing payload for the wire.
#[must_use]
pub fn to_wire(mut value: Value, profile: &TransformProfile) -> Value {
    // Exclusion runs first; inclusion narrows whatever survived it.
    apply_exclusions(&mut value, profile.exclude_fields);
    apply_inclusions(&mut value, profile.include_fields);

    keys::convert_keys(&mut value, keys::KeyStyle::Snake);

    // Keys are snake_case from here on, so match the converted names.
    let dates = field_set(profile.date_fields, camel_to_snake);
    let booleans = field_set(profile.boolean_fields, camel_to_snake);
    let numbers = field_set(profile.number_fields, camel_to_snake);

    let format = profile.date_format;
    replace_fields(&mut value, &dates, |v| coerce::format_date(v, format));
    replace_fields(&mut value, &booleans, coerce::coerce_boolean);
    replace_fields(&mut value, &numbers, coerce::coerce_number);

    if profile.strip_nulls {
        strip_nulls(&mut value);
    }
    value
}

/// Shape an incoming payload for application code.
#[must_use]
pub fn from_wire(mut value: Value, profile: &TransformProfile) -> Value {
    keys::convert_keys(&mut value, keys::KeyStyle::Camel);

    let dates = field_set(profile.date_fields, str::to_string);
    let booleans = field_set(profile.boolean_fields, str::to_string);
    let numbers = field_set(profile.number_fields, str::to_string);

    replace_fields(&mut value, &dates, |v| {
        coerce::parse_date(v).unwrap_or_else(|| v.clone())
    });
    replace_fields(&mut value, &booleans, coerce::coerce_boolean);
    replace_fields(&mut value, &numbers, coerce::coerce_number);
    value
}

fn field_set(fields: &[&str], convert: impl Fn(&str) -> String) -> HashSet<String> {
    fields.iter().map(|field| convert(field)).collect()
}

/// Visit every object in the tree, iteratively, up to [`MAX_DEPTH`].
fn for_each_object(root: &mut Value, mut visit: impl FnMut(&mut serde_json::Map<String, Value>)) {
    let mut stack: Vec<(&mut Value, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            continue;
        }
        match node {
            Value::Object(map) => {
                visit(map);
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

fn replace_fields(
    root: &mut Value,
    fields: &HashSet<String>,
    mut transform: impl FnMut(&Value) -> Value,
) {
    if fields.is_empty() {
        return;
    }
    for_each_object(root, |map| {
        for (key, slot) in map.iter_mut() {
            if fields.contains(key.as_str()) {
                let replacement = transform(&*slot);
                *slot = replacement;
            }
        }
    });
}

fn apply_exclusions(root: &mut Value, fields: &[&str]) {
    if fields.is_empty() {
        return;
    }
    let excluded: HashSet<&str> = fields.iter().copied().collect();
    for_each_object(root, |map| {
        map.retain(|key, _| !excluded.contains(key.as_str()));
    });
}

fn apply_inclusions(root: &mut Value, fields: &[&str]) {
    if fields.is_empty() {
        return;
    }
    let included: HashSet<&str> = fields.iter().copied().collect();
    for_each_object(root, |map| {
        map.retain(|key, _| included.contains(key.as_str()));
    });
}

/// Remove null-valued keys from objects and null elements from arrays.
fn strip_nulls(root: &mut Value) {
    let mut stack: Vec<(&mut Value, usize)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_DEPTH {
            continue;
        }
        match node {
            Value::Object(map) => {
                map.retain(|_, child| !child.is_null());
                for child in map.values_mut() {
                    stack.push((child, depth + 1));
                }
            }
            Value::Array(items) => {
                items.retain(|child| !child.is_null());
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

    const ROUNDTRIP: TransformProfile = TransformProfile {
        date_fields: &["createdAt"],
        number_fields: &[],
        boolean_fields: &[],
        exclude_fields: &[],
        include_fields: &[],
        date_format: DateFormat::Iso8601,
        strip_nulls: false,
    };

    #[test]
    fn request_pipeline_runs_all_steps() {
        let profile = TransformProfile {
            date_fields: &["dueDate"],
            number_fields: &["totalAmount"],
            boolean_fields: &["isPaid"],
            exclude_fields: &["internalNotes"],
            include_fields: &[],
            date_format: DateFormat::Iso8601,
            strip_nulls: true,
        };
        let payload = json!({
            "dueDate": "2024-06-30",
            "totalAmount": "1190.00",
            "isPaid": "no",
            "internalNotes": "do not send",
            "customerRef": null,
        });

        let wire = to_wire(payload, &profile);

        assert_eq!(
            wire,
            json!({
                "due_date": "2024-06-30T00:00:00Z",
                "total_amount": 1190.0,
                "is_paid": false,
            })
        );
    }

    #[test]
    fn date_roundtrip_preserves_the_second() {
        let original = json!({ "createdAt": "2024-03-01T09:30:45Z" });

        let wire = to_wire(original.clone(), &ROUNDTRIP);
        let back = from_wire(wire, &ROUNDTRIP);

        assert_eq!(back, original);
    }

    #[test]
    fn epoch_roundtrip_preserves_the_second() {
        let profile = TransformProfile { date_format: DateFormat::EpochMillis, ..ROUNDTRIP };
        let original = json!({ "createdAt": "2024-03-01T09:30:45Z" });

        let wire = to_wire(original.clone(), &profile);
        assert_eq!(wire, json!({ "created_at": "1709285445000" }));

        let back = from_wire(wire, &profile);
        assert_eq!(back, original);
    }

    #[test]
    fn null_stripping_removes_nested_nulls() {
        let profile = TransformProfile { strip_nulls: true, ..ROUNDTRIP };
        let payload = json!({ "a": 1, "b": null, "c": { "d": null, "e": 2 } });

        let wire = to_wire(payload, &profile);

        assert_eq!(wire, json!({ "a": 1, "c": { "e": 2 } }));
    }

    #[test]
    fn null_array_elements_are_filtered() {
        let profile = TransformProfile { strip_nulls: true, ..ROUNDTRIP };
        let payload = json!({ "lines": [1, null, { "x": null }, 2] });

        let wire = to_wire(payload, &profile);

        assert_eq!(wire, json!({ "lines": [1, { }, 2] }));
    }

    #[test]
    fn exclude_runs_before_include() {
        let profile = TransformProfile {
            exclude_fields: &["secret"],
            include_fields: &["secret", "name"],
            ..ROUNDTRIP
        };
        let payload = json!({ "secret": "x", "name": "ACME", "extra": 1 });

        let wire = to_wire(payload, &profile);

        // "secret" was excluded first, so include cannot resurrect it;
        // include then drops everything not named.
        assert_eq!(wire, json!({ "name": "ACME" }));
    }

    #[test]
    fn exclusion_is_recursive() {
        let profile = TransformProfile { exclude_fields: &["password"], ..ROUNDTRIP };
        let payload = json!({
            "password": "p",
            "owner": { "password": "q", "name": "n" },
            "members": [{ "password": "r" }],
        });

        let wire = to_wire(payload, &profile);

        assert_eq!(
            wire,
            json!({ "owner": { "name": "n" }, "members": [{}] })
        );
    }

    #[test]
    fn response_pipeline_parses_and_renames() {
        let profile = TransformProfile {
            date_fields: &["bookedAt"],
            number_fields: &["amount"],
            boolean_fields: &["isReconciled"],
            ..ROUNDTRIP
        };
        let wire = json!({
            "booked_at": 1709285445000_i64,
            "amount": "250.75",
            "is_reconciled": 1,
            "counterparty_name": "ACME",
        });

        let parsed = from_wire(wire, &profile);

        assert_eq!(
            parsed,
            json!({
                "bookedAt": "2024-03-01T09:30:45Z",
                "amount": 250.75,
                "isReconciled": true,
                "counterpartyName": "ACME",
            })
        );
    }

    #[test]
    fn response_pipeline_does_not_strip_nulls() {
        let parsed = from_wire(json!({ "amount_due": null }), &ROUNDTRIP);
        assert_eq!(parsed, json!({ "amountDue": null }));
    }

    #[test]
    fn nodes_beyond_the_depth_bound_pass_through() {
        let mut deep = json!({ "leafKey": 1 });
        for _ in 0..(MAX_DEPTH + 8) {
            deep = json!({ "nestedLevel": deep });
        }

        let wire = to_wire(deep, &ROUNDTRIP);

        // The shallow keys converted; walk down far enough and the
        // remainder is untouched.
        let mut cursor = &wire;
        let mut converted = 0;
        while let Some(next) = cursor.get("nested_level") {
            converted += 1;
            cursor = next;
        }
        assert!(converted > MAX_DEPTH / 2);
        assert!(cursor.get("nestedLevel").is_some() || cursor.get("leafKey").is_some());
    }

    #[test]
    fn named_profiles_shape_their_resources() {
        let wire = to_wire(
            json!({
                "email": "cfo@acme.test",
                "password": "hunter2",
                "isActive": "yes",
            }),
            Resource::User.profile(),
        );

        assert_eq!(
            wire,
            json!({ "email": "cfo@acme.test", "is_active": true })
        );
    }
}
