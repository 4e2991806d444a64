// SPDX-License-Identifier: Apache-2.0

/// Tree-sitter query for extracting Go definitions and imports
pub const ELEMENT_QUERY: &str = r#"
    (function_declaration name: (identifier) @func.name) @func.def

    ; Methods keep their bare name; calls connect by name
    (method_declaration name: (field_identifier) @func.name) @func.def

    (type_declaration (type_spec name: (type_identifier) @type.name)) @type.def

    (import_declaration) @import
"#;

/// Tree-sitter query for extracting Go call sites
pub const CALL_QUERY: &str = r#"
    ; Function calls
    (call_expression
      function: (identifier) @function.call)

    ; Method and package-qualified calls (x.F())
    (call_expression
      function: (selector_expression
        field: (field_identifier) @method.call))
"#;
