use rocket::Route;

mod pages;
mod questions;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(pages::routes());
    routes.extend(questions::routes());
    routes
}
