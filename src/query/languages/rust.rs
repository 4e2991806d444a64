// SPDX-License-Identifier: Apache-2.0

/// Tree-sitter query for extracting Rust definitions and imports
pub const ELEMENT_QUERY: &str = r#"
    (function_item name: (identifier) @func.name) @func.def
    (struct_item name: (type_identifier) @type.name) @type.def
    (enum_item name: (type_identifier) @type.name) @type.def
    (use_declaration) @import
"#;

/// Tree-sitter query for extracting Rust call sites
pub const CALL_QUERY: &str = r#"
    ; Function calls
    (call_expression
      function: (identifier) @function.call)

    ; Method calls
    (call_expression
      function: (field_expression
        field: (field_identifier) @method.call))

    ; Associated function calls (e.g., Type::method())
    (call_expression
      function: (scoped_identifier) @scoped.call)

    ; Macro calls
    (macro_invocation
      macro: (identifier) @macro.call)
"#;
