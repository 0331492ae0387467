use rocket::{form::Form, response::Redirect, Route};
use rocket_dyn_templates::{context, Template};

use crate::error::Result;
use crate::model::store::Store;

pub fn routes() -> Vec<Route> {
    routes![ask_form, submit, recent_questions]
}

/// The submission form. The field is optional so that a submission without
/// it behaves like a blank one instead of failing to parse.
#[derive(FromForm)]
pub struct AskForm<'r> {
    question: Option<&'r str>,
}

/// The two ways a submission can resolve: stored (send the user to the
/// list) or blank (hand the form back without comment).
#[derive(Responder)]
enum SubmitResponse {
    Stored(Redirect),
    Blank(Template),
}

#[get("/ask")]
fn ask_form() -> Template {
    Template::render("ask", context! {})
}

#[post("/ask", data = "<form>")]
async fn submit(form: Form<AskForm<'_>>, store: Store<'_>) -> Result<SubmitResponse> {
    let text = form.question.unwrap_or_default().trim();
    if text.is_empty() {
        return Ok(SubmitResponse::Blank(Template::render("ask", context! {})));
    }

    let question = store.insert(text.to_string()).await?;
    info!("Stored question {}", question.id);
    Ok(SubmitResponse::Stored(Redirect::to(uri!(recent_questions))))
}

#[get("/recent-questions")]
async fn recent_questions(store: Store<'_>) -> Result<Template> {
    let questions = store.load().await?;
    Ok(Template::render(
        "recent_questions",
        context! { questions: &questions },
    ))
}
