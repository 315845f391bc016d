//! End-to-end tests for the instrumentation pipeline

use js_state_tracker::analysis::{DiagnosticKind, Location};
use js_state_tracker::patch::HEADER_LINES;
use js_state_tracker::{InstrumentOptions, Instrumenter};

fn instrumenter() -> Instrumenter {
    Instrumenter::new(InstrumentOptions::default()).expect("default options are valid")
}

#[test]
fn test_global_assignment_scenario() {
    let output = instrumenter()
        .instrument("let x = 1;\nx = 2;")
        .expect("Failed to instrument");

    assert_eq!(output.state_table_json, r#"{"Program:x":null}"#);
    assert_eq!(
        output.instrumented_source,
        concat!(
            "/* autogen added */\n",
            "let stateManager = {\"Program:x\":null};\n",
            "/* end autogen added */\n",
            "\n",
            "let x = 1;\n",
            "stateManager[\"Program:x\"] = x; /* autogen added */\n",
            "x = 2;\n",
            "stateManager[\"Program:x\"] = x; /* autogen added */",
        )
    );
}

#[test]
fn test_function_parameter_scenario() {
    let output = instrumenter()
        .instrument("function f(a) { let b = a + 1; }")
        .expect("Failed to instrument");

    let keys: Vec<_> = output.analysis.state_table.keys().collect();
    assert_eq!(keys, vec!["Program:f:a", "Program:f:b"]);

    let function_scope = &output.analysis.scopes[0];
    assert_eq!(function_scope.name, "Program:f");
    assert_eq!(function_scope.declared, vec!["b"]);
}

#[test]
fn test_missing_synthetic_name_scenario() {
    let source = "var run = function (n) {\n  var doubled = n * 2;\n};\nrun(2);";
    let output = instrumenter().instrument(source).expect("Failed to instrument");

    let diagnostics = &output.analysis.diagnostics;
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::NotDeanonymized);
    assert_eq!(diagnostics[0].location, Location::new(1, 10));
    assert!(output.analysis.state_table.contains("Program:run:doubled"));
    assert!(output.instrumented_source.ends_with("run(2);"));
}

#[test]
fn test_every_binding_registered_once() {
    let source = std::fs::read_to_string("tests/data/updated_checkout.js").expect("Failed to read fixture");
    let analysis = instrumenter().analyze(&source).expect("Failed to analyze");
    let keys: Vec<_> = analysis.state_table.keys().collect();

    assert_eq!(
        keys,
        vec![
            "Program:TAX_RATE",
            "Program:cart",
            "Program:addItem:name",
            "Program:addItem:price",
            "Program:addItem:item",
            "Program:addItem:cart",
            "Program:computeTotal",
            "Program:computeTotal:discount",
            "Program:computeTotal:subtotal",
            "Program:computeTotal:taxed",
            "Program:grand",
        ]
    );

    let scopes: Vec<(&str, Vec<&str>)> = analysis
        .scopes
        .iter()
        .map(|scope| {
            let declared = scope.declared.iter().map(String::as_str).collect();
            (scope.name.as_str(), declared)
        })
        .collect();
    assert_eq!(
        scopes,
        vec![
            ("Program:addItem", vec!["item"]),
            ("Program:computeTotal", vec!["subtotal", "taxed"]),
            ("Program", vec!["TAX_RATE", "cart", "computeTotal", "grand"]),
        ]
    );
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn test_instrumented_line_count() {
    let source = std::fs::read_to_string("tests/data/updated_checkout.js").expect("Failed to read fixture");
    let output = instrumenter().instrument(&source).expect("Failed to instrument");

    let original_lines = source.split('\n').count();
    let sites = output.analysis.update_sites.len();
    assert_eq!(sites, 9);
    assert_eq!(
        output.instrumented_source.split('\n').count(),
        original_lines + sites + HEADER_LINES
    );
}

#[test]
fn test_patches_follow_their_lines() {
    let source = std::fs::read_to_string("tests/data/updated_checkout.js").expect("Failed to read fixture");
    let output = instrumenter().instrument(&source).expect("Failed to instrument");
    let lines: Vec<_> = output.instrumented_source.split('\n').collect();

    let member_write = lines
        .iter()
        .position(|line| *line == "  cart.total = cart.total + price;")
        .expect("member write survives");
    assert_eq!(
        lines[member_write + 1],
        r#"stateManager["Program:addItem:cart"] = cart; /* autogen added */"#
    );

    let reassignment = lines
        .iter()
        .position(|line| *line == "grand = Math.round(grand);")
        .expect("reassignment survives");
    assert_eq!(
        lines[reassignment + 1],
        r#"stateManager["Program:grand"] = grand; /* autogen added */"#
    );

    // The function-expression binding is written back after the closing line
    let closing = lines.iter().position(|line| *line == "};").expect("closing brace");
    assert_eq!(
        lines[closing + 1],
        r#"stateManager["Program:computeTotal"] = computeTotal; /* autogen added */"#
    );
}

#[test]
fn test_runs_are_deterministic() {
    let source = std::fs::read_to_string("tests/data/updated_checkout.js").expect("Failed to read fixture");
    let first = instrumenter().instrument(&source).expect("Failed to instrument");
    let second = instrumenter().instrument(&source).expect("Failed to instrument");

    assert_eq!(first.state_table_json, second.state_table_json);
    assert_eq!(first.scope_list_json, second.scope_list_json);
    assert_eq!(first.instrumented_source, second.instrumented_source);
}

#[test]
fn test_nested_scope_keys_are_fully_qualified() {
    let analysis = instrumenter()
        .analyze("function a() { function b(x) {} }\nfunction c() { function b(x) {} }")
        .expect("Failed to analyze");

    let keys: Vec<_> = analysis.state_table.keys().collect();
    assert_eq!(keys, vec!["Program:a:b:x", "Program:c:b:x"]);
}

#[test]
fn test_custom_table_identifier() {
    let options = InstrumentOptions {
        table_identifier: "__state".to_string(),
        ..Default::default()
    };
    let output = Instrumenter::new(options)
        .expect("valid options")
        .instrument("let n = 0;")
        .expect("Failed to instrument");
    assert!(output.instrumented_source.contains("let __state = {\"Program:n\":null};"));
    assert!(output.instrumented_source.contains("__state[\"Program:n\"] = n;"));
}
