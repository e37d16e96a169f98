//! The page shown when a request fails on the server.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 response explaining what went wrong and what the operator can do about it.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later, or check the server logs if the problem persists.",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::{
        Error,
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn invalid_timezone_explains_the_fix() {
        let response = Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text: String = html
            .select(&Selector::parse("p").unwrap())
            .flat_map(|paragraph| paragraph.text())
            .collect();
        assert!(text.contains("Invalid Timezone Settings"));
        assert!(text.contains("Mars/Olympus_Mons"));
    }
}
