// SPDX-License-Identifier: Apache-2.0

/// Tree-sitter query for extracting Python definitions and imports
pub const ELEMENT_QUERY: &str = r#"
    (function_definition name: (identifier) @func.name) @func.def
    (class_definition name: (identifier) @type.name) @type.def
    (import_statement) @import
    (import_from_statement) @import
"#;

/// Tree-sitter query for extracting Python call sites
pub const CALL_QUERY: &str = r#"
    ; Function calls
    (call
      function: (identifier) @function.call)

    ; Method calls
    (call
      function: (attribute
        attribute: (identifier) @method.call))
"#;
