use rocket::Route;
use rocket_dyn_templates::{context, Template};

pub fn routes() -> Vec<Route> {
    routes![home]
}

#[get("/")]
fn home() -> Template {
    Template::render("home", context! {})
}
