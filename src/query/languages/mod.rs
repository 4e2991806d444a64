// SPDX-License-Identifier: Apache-2.0

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust;

/// Language configuration containing all language-specific information.
///
/// Element queries pair a `@*.def` capture (the whole definition node, so
/// positions can be resolved against full spans) with a `@*.name` capture.
#[derive(Copy, Clone)]
pub struct LanguageInfo {
    pub element_query: &'static str,
    pub call_query: &'static str,
    pub function_node_kinds: &'static [&'static str],
    pub function_name_kinds: &'static [&'static str],
}

/// Get language configuration for a given language.
pub fn language_info(language: &str) -> Option<LanguageInfo> {
    match language {
        "rust" => Some(LanguageInfo {
            element_query: rust::ELEMENT_QUERY,
            call_query: rust::CALL_QUERY,
            function_node_kinds: &["function_item"],
            function_name_kinds: &["identifier"],
        }),
        "go" => Some(LanguageInfo {
            element_query: go::ELEMENT_QUERY,
            call_query: go::CALL_QUERY,
            function_node_kinds: &["function_declaration", "method_declaration"],
            function_name_kinds: &["identifier", "field_identifier"],
        }),
        "python" => Some(LanguageInfo {
            element_query: python::ELEMENT_QUERY,
            call_query: python::CALL_QUERY,
            function_node_kinds: &["function_definition"],
            function_name_kinds: &["identifier"],
        }),
        "javascript" | "typescript" => Some(LanguageInfo {
            element_query: javascript::ELEMENT_QUERY,
            call_query: javascript::CALL_QUERY,
            function_node_kinds: &[
                "function_declaration",
                "method_definition",
                "arrow_function",
            ],
            function_name_kinds: &["identifier", "property_identifier"],
        }),
        _ => None,
    }
}
