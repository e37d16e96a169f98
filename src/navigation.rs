//! The navigation bar shown at the top of every page.

use maud::{Markup, html};

use crate::endpoints;

/// The pages in the navigation bar as (endpoint, title) pairs, in display order.
const PAGES: [(&str, &str); 2] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::REPORTS_VIEW, "Reports"),
];

const LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 lg:dark:hover:bg-transparent";
const CURRENT_LINK_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

/// The navigation bar with the link for the page being viewed highlighted.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl NavBar<'_> {
    /// Create a navigation bar for the page at `active_endpoint`.
    ///
    /// Endpoints that are not in the navigation bar leave every link inactive.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        NavBar { active_endpoint }
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center"
                    {
                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Servicebay"
                        }
                    }

                    ul class="font-medium flex flex-row gap-4 lg:gap-8"
                    {
                        @for (url, title) in PAGES {
                            @let is_current = url == self.active_endpoint;

                            li
                            {
                                a
                                    href=(url)
                                    class=(if is_current { CURRENT_LINK_STYLE } else { LINK_STYLE })
                                    aria-current=[is_current.then_some("page")]
                                {
                                    (title)
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}
