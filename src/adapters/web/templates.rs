//! HTML templates using Askama.

use askama::Template;

use crate::domain::watchlist::Asset;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub assets: &'a [Asset],
    pub currency: &'a str,
}
