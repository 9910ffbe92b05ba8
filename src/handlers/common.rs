// HTMX partial templates shared across handlers

use askama::Template;

#[derive(Template)]
#[template(path = "partials/error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
}

#[derive(Template)]
#[template(path = "partials/success.html")]
pub struct SuccessTemplate<'a> {
    pub message: &'a str,
}
