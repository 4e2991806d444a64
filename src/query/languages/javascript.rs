// SPDX-License-Identifier: Apache-2.0

/// Tree-sitter query for extracting JavaScript definitions and imports
pub const ELEMENT_QUERY: &str = r#"
    (function_declaration name: (identifier) @func.name) @func.def
    (method_definition name: (property_identifier) @func.name) @func.def
    (class_declaration name: (identifier) @type.name) @type.def
    (import_statement) @import
"#;

/// Tree-sitter query for extracting JavaScript call sites
pub const CALL_QUERY: &str = r#"
    ; Function calls
    (call_expression
      function: (identifier) @function.call)

    ; Method calls
    (call_expression
      function: (member_expression
        property: (property_identifier) @method.call))

    ; Constructor calls
    (new_expression
      constructor: (identifier) @constructor.call)
"#;
