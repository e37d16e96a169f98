#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;

pub(crate) use html::{assert_element_exists, assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_status_ok, get_header, read_body_text, read_json};
