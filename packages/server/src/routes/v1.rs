use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/categories", category_routes())
        .nest("/courses", course_routes())
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::category::list_categories))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_courses,
            handlers::course::create_course
        ))
        .routes(routes!(
            handlers::course::get_course,
            handlers::course::update_course
        ))
        .routes(routes!(handlers::attachment::create_attachment))
        .routes(routes!(handlers::attachment::delete_attachment))
        .routes(routes!(handlers::chapter::create_chapter))
        .routes(routes!(handlers::chapter::reorder_chapters))
        .routes(routes!(handlers::chapter::get_chapter))
}
