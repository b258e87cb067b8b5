//! Declarative argv synthesis from a tool's mapping spec.

use serde_json::{Map, Number, Value};

use crate::registry::{ArgKind, ExecSpec};

/// Build the full argument vector: the spec's fixed argv template followed
/// by one expansion per mapping, in mapping declaration order (the request
/// `args` object itself is unordered).
pub fn build_argv(exec: &ExecSpec, args: &Map<String, Value>) -> Vec<String> {
    let mut argv = exec.argv.clone();
    for mapping in &exec.args_mapping {
        let Some(value) = args.get(&mapping.input) else {
            continue;
        };
        match value {
            Value::Bool(true) => match mapping.kind {
                ArgKind::Flag => argv.push(mapping.flag.clone()),
                ArgKind::Value => {
                    argv.push(mapping.flag.clone());
                    argv.push("true".to_string());
                }
            },
            Value::Bool(false) => {}
            Value::String(text) => {
                argv.push(mapping.flag.clone());
                argv.push(text.clone());
            }
            Value::Number(number) => {
                argv.push(mapping.flag.clone());
                argv.push(number_text(number));
            }
            Value::Array(items) => {
                for item in items {
                    argv.push(mapping.flag.clone());
                    argv.push(scalar_text(item));
                }
            }
            other => {
                argv.push(mapping.flag.clone());
                argv.push(scalar_text(other));
            }
        }
    }
    argv
}

/// Textual rendering of a single list element or fallback value: strings
/// render bare, numbers through [`number_text`], everything else as its
/// compact JSON form.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number_text(number),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Canonical minimal decimal text for a JSON number. Integral values render
/// as integers; `f64` `Display` otherwise, which never produces scientific
/// notation.
fn number_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    if let Some(float) = number.as_f64() {
        return format!("{float}");
    }
    number.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArgMapping;
    use serde_json::json;

    fn exec_with_mappings(mappings: Vec<ArgMapping>) -> ExecSpec {
        ExecSpec {
            argv: vec!["/usr/bin/tool".to_string(), "sub".to_string()],
            args_mapping: mappings,
            working_dir: None,
        }
    }

    fn mapping(input: &str, flag: &str, kind: ArgKind) -> ArgMapping {
        ArgMapping {
            input: input.to_string(),
            flag: flag.to_string(),
            kind,
            repeated: false,
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().expect("object literal").clone()
    }

    #[test]
    fn template_alone_when_no_args_match() {
        let exec = exec_with_mappings(vec![mapping("verbose", "--verbose", ArgKind::Flag)]);
        let argv = build_argv(&exec, &args(json!({"unrelated": 1})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub"]);
    }

    #[test]
    fn bool_true_flag_kind_emits_bare_flag() {
        let exec = exec_with_mappings(vec![mapping("verbose", "--verbose", ArgKind::Flag)]);
        let argv = build_argv(&exec, &args(json!({"verbose": true})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub", "--verbose"]);
    }

    #[test]
    fn bool_true_value_kind_emits_literal_true() {
        let exec = exec_with_mappings(vec![mapping("verbose", "--verbose", ArgKind::Value)]);
        let argv = build_argv(&exec, &args(json!({"verbose": true})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub", "--verbose", "true"]);
    }

    #[test]
    fn bool_false_emits_nothing() {
        let exec = exec_with_mappings(vec![
            mapping("verbose", "--verbose", ArgKind::Flag),
            mapping("force", "--force", ArgKind::Value),
        ]);
        let argv = build_argv(&exec, &args(json!({"verbose": false, "force": false})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub"]);
    }

    #[test]
    fn string_emits_flag_and_value() {
        let exec = exec_with_mappings(vec![mapping("out", "-o", ArgKind::Value)]);
        let argv = build_argv(&exec, &args(json!({"out": "report.txt"})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub", "-o", "report.txt"]);
    }

    #[test]
    fn numbers_render_minimal_decimal_never_scientific() {
        let exec = exec_with_mappings(vec![mapping("n", "--n", ArgKind::Value)]);

        assert_eq!(
            build_argv(&exec, &args(json!({"n": 42})))[3],
            "42".to_string()
        );
        assert_eq!(build_argv(&exec, &args(json!({"n": 1.5})))[3], "1.5");
        assert_eq!(build_argv(&exec, &args(json!({"n": -0.25})))[3], "-0.25");
        // Large magnitudes stay in plain decimal form.
        let argv = build_argv(&exec, &args(json!({"n": 1e21})));
        assert!(!argv[3].contains('e') && !argv[3].contains('E'), "{}", argv[3]);
        assert!(argv[3].starts_with('1'));
    }

    #[test]
    fn list_repeats_flag_per_element_in_order() {
        let exec = exec_with_mappings(vec![mapping("tag", "--tag", ArgKind::Value)]);
        let argv = build_argv(&exec, &args(json!({"tag": ["a", 2, true]})));
        assert_eq!(
            argv,
            vec!["/usr/bin/tool", "sub", "--tag", "a", "--tag", "2", "--tag", "true"]
        );
    }

    #[test]
    fn other_value_types_fall_back_to_json_text() {
        let exec = exec_with_mappings(vec![mapping("meta", "--meta", ArgKind::Value)]);
        let argv = build_argv(&exec, &args(json!({"meta": {"k": "v"}})));
        assert_eq!(argv[3], r#"{"k":"v"}"#);

        let argv = build_argv(&exec, &args(json!({"meta": null})));
        assert_eq!(argv[3], "null");
    }

    #[test]
    fn mappings_apply_in_declaration_order() {
        let exec = exec_with_mappings(vec![
            mapping("b", "--b", ArgKind::Value),
            mapping("a", "--a", ArgKind::Value),
        ]);
        let argv = build_argv(&exec, &args(json!({"a": "1", "b": "2"})));
        assert_eq!(argv, vec!["/usr/bin/tool", "sub", "--b", "2", "--a", "1"]);
    }
}
