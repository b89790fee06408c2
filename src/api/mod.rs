use rocket::Route;

mod admin;
mod assistant;
mod candidate;
mod public;
mod voter;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(public::routes());
    routes.extend(voter::routes());
    routes.extend(candidate::routes());
    routes.extend(admin::routes());
    routes.extend(assistant::routes());
    routes
}
