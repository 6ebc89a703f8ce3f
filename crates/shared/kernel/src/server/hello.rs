use axum::Json;
use axum::extract::Path;
use dayqhi_derive::{api_handler, api_model};
use dayqhi_domain::constants::SYSTEM_TAG;

#[api_model]
pub(super) struct Greeting {
    message: String,
}

#[api_handler(
    get,
    path = "/api/hello",
    responses((status = OK, description = "Static greeting", body = Greeting)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn hello_handler() -> Json<Greeting> {
    Json(Greeting { message: "Hello World".to_owned() })
}

#[api_handler(
    get,
    path = "/api/hello/{name}",
    params(("name" = String, Path, description = "Name to greet")),
    responses((status = OK, description = "Personal greeting", body = Greeting)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn greet_handler(Path(name): Path<String>) -> Json<Greeting> {
    Json(Greeting { message: format!("Hello {name}") })
}
